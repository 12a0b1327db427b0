use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::prediction::PredictionResult;

/// An uploaded medical report together with its prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub prediction: PredictionResult,
    pub created_at: NaiveDateTime,
}
