use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::EmergencyStatus;

/// An emergency raised by a patient.
/// `doctor_id` stays empty until a doctor acknowledges it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Emergency {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub condition: String,
    pub status: EmergencyStatus,
    pub created_at: NaiveDateTime,
}

/// Pending emergency as shown on a doctor's dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyAlert {
    pub emergency: Emergency,
    pub patient_name: String,
}
