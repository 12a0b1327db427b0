use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// A consultation booked by a patient with a doctor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub department: String,
    pub date: NaiveDate,
    /// Slot start as "HH:MM", 24-hour clock.
    pub time: String,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
}

/// Appointment as listed for a patient, with the doctor's name attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentView {
    pub appointment: Appointment,
    pub doctor_name: String,
}
