//! Emergency alerts: a patient raises one, any doctor sees it until one of
//! them acknowledges it and becomes its assigned doctor.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::{Emergency, EmergencyAlert, EmergencyStatus, UserRole};

#[derive(Error, Debug)]
pub enum EmergencyError {
    #[error("Invalid emergency: {0}")]
    Validation(String),

    #[error("User {0} is not a doctor")]
    NotADoctor(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Emergency {0} was already acknowledged")]
    AlreadyAcknowledged(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Record a pending emergency for a patient. No doctor is assigned yet.
pub fn raise_emergency(
    conn: &Connection,
    patient_id: &Uuid,
    condition: &str,
) -> Result<Emergency, EmergencyError> {
    let condition = condition.trim();
    if condition.is_empty() {
        return Err(EmergencyError::Validation("condition is required".into()));
    }
    if repository::get_user(conn, patient_id)?.is_none() {
        return Err(EmergencyError::NotFound(format!("patient {patient_id}")));
    }

    let emergency = Emergency {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        doctor_id: None,
        condition: condition.to_string(),
        status: EmergencyStatus::Pending,
        created_at: repository::now_timestamp(),
    };
    repository::insert_emergency(conn, &emergency)?;

    tracing::warn!(
        emergency_id = %emergency.id,
        patient_id = %patient_id,
        "Emergency raised"
    );
    Ok(emergency)
}

fn require_doctor(conn: &Connection, doctor_id: &Uuid) -> Result<(), EmergencyError> {
    match repository::get_user(conn, doctor_id)? {
        Some(user) if user.role == UserRole::Doctor => Ok(()),
        Some(_) => Err(EmergencyError::NotADoctor(*doctor_id)),
        None => Err(EmergencyError::NotFound(format!("doctor {doctor_id}"))),
    }
}

/// Pending alerts for a doctor's dashboard: assigned to them or unassigned.
pub fn pending_emergencies_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<EmergencyAlert>, EmergencyError> {
    require_doctor(conn, doctor_id)?;
    Ok(repository::get_pending_emergencies_for_doctor(conn, doctor_id)?)
}

/// Acknowledge a pending emergency, assigning it to `doctor_id`.
pub fn acknowledge_emergency(
    conn: &Connection,
    emergency_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Emergency, EmergencyError> {
    require_doctor(conn, doctor_id)?;

    let existing = repository::get_emergency(conn, emergency_id)?
        .ok_or_else(|| EmergencyError::NotFound(format!("emergency {emergency_id}")))?;
    if existing.status == EmergencyStatus::Acknowledged {
        return Err(EmergencyError::AlreadyAcknowledged(*emergency_id));
    }

    // Guarded by status so a concurrent acknowledgement cannot be overwritten
    if repository::acknowledge_emergency(conn, emergency_id, doctor_id)? == 0 {
        return Err(EmergencyError::AlreadyAcknowledged(*emergency_id));
    }

    tracing::info!(
        emergency_id = %emergency_id,
        doctor_id = %doctor_id,
        "Emergency acknowledged"
    );

    repository::get_emergency(conn, emergency_id)?
        .ok_or_else(|| EmergencyError::NotFound(format!("emergency {emergency_id}")))
}
