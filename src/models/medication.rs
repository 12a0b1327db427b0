use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MedicationStatus;

/// A medication reminder set by a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medicine: String,
    pub dosage: String,
    /// Reminder times as "HH:MM", 24-hour clock.
    pub times: Vec<String>,
    pub status: MedicationStatus,
    pub created_at: NaiveDateTime,
}
