//! Appointment booking: a patient picks a doctor, a department, a date and a
//! half-hour slot within clinic hours.

use chrono::{NaiveDate, NaiveTime, Timelike};
use rusqlite::{Connection, ErrorCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::{Appointment, AppointmentStatus, AppointmentView, UserRole};

pub const DEPARTMENTS: &[&str] = &[
    "Cardiology",
    "Neurology",
    "Orthopedics",
    "Dermatology",
    "Pediatrics",
    "Internal Medicine",
    "Emergency Medicine",
];

/// First and last bookable slot starts, in minutes after midnight.
const FIRST_SLOT_MINUTES: u32 = 9 * 60;
const LAST_SLOT_MINUTES: u32 = 16 * 60 + 30;
const SLOT_LENGTH_MINUTES: u32 = 30;

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Invalid appointment: {0}")]
    Validation(String),

    #[error("Invalid appointment date '{0}'")]
    InvalidDate(String),

    #[error("Invalid time slot '{0}', expected a half-hour slot between 09:00 and 16:30")]
    InvalidSlot(String),

    #[error("User {0} is not a doctor")]
    NotADoctor(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Doctor {doctor_id} is already booked on {date} at {time}")]
    SlotTaken {
        doctor_id: Uuid,
        date: NaiveDate,
        time: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ─── Types ───

/// Booking request as entered by the patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub department: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `hh:MM AM`
    pub time: String,
}

// ─── Validation ───

/// Canonical department name, matched case-insensitively.
pub fn normalize_department(raw: &str) -> Result<&'static str, AppointmentError> {
    let wanted = raw.trim();
    DEPARTMENTS
        .iter()
        .find(|d| d.eq_ignore_ascii_case(wanted))
        .copied()
        .ok_or_else(|| AppointmentError::Validation(format!("unknown department '{wanted}'")))
}

/// Parse a slot in 24-hour (`14:30`) or 12-hour (`02:30 PM`) form and return it
/// as `HH:MM`. Slots start on the hour or half hour within clinic hours.
pub fn normalize_slot(raw: &str) -> Result<String, AppointmentError> {
    let trimmed = raw.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%I:%M %p"))
        .map_err(|_| AppointmentError::InvalidSlot(raw.to_string()))?;

    let minutes = time.hour() * 60 + time.minute();
    if minutes % SLOT_LENGTH_MINUTES != 0
        || !(FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES).contains(&minutes)
    {
        return Err(AppointmentError::InvalidSlot(raw.to_string()));
    }
    Ok(time.format("%H:%M").to_string())
}

/// Parse `YYYY-MM-DD`; dates before `today` cannot be booked.
pub fn parse_appointment_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, AppointmentError> {
    let date = NaiveDate::parse_from_str(raw.trim(), repository::DATE_FORMAT)
        .map_err(|_| AppointmentError::InvalidDate(raw.to_string()))?;
    if date < today {
        return Err(AppointmentError::Validation(format!("{date} is in the past")));
    }
    Ok(date)
}

// ─── Booking ───

/// Book a pending appointment for `patient_id`.
pub fn create_appointment(
    conn: &Connection,
    patient_id: &Uuid,
    new: &NewAppointment,
    today: NaiveDate,
) -> Result<Appointment, AppointmentError> {
    let department = normalize_department(&new.department)?;
    let date = parse_appointment_date(&new.date, today)?;
    let time = normalize_slot(&new.time)?;

    if repository::get_user(conn, patient_id)?.is_none() {
        return Err(AppointmentError::NotFound(format!("patient {patient_id}")));
    }
    match repository::get_user(conn, &new.doctor_id)? {
        Some(user) if user.role == UserRole::Doctor => {}
        Some(_) => return Err(AppointmentError::NotADoctor(new.doctor_id)),
        None => {
            return Err(AppointmentError::NotFound(format!("doctor {}", new.doctor_id)))
        }
    }

    let slot_taken = || AppointmentError::SlotTaken {
        doctor_id: new.doctor_id,
        date,
        time: time.clone(),
    };
    if repository::is_slot_taken(conn, &new.doctor_id, &date, &time)? {
        return Err(slot_taken());
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        doctor_id: new.doctor_id,
        department: department.to_string(),
        date,
        time: time.clone(),
        status: AppointmentStatus::Pending,
        created_at: repository::now_timestamp(),
    };

    // The partial unique index catches a booking that raced the check above
    match repository::insert_appointment(conn, &appointment) {
        Ok(()) => {}
        Err(DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(e, _)))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            return Err(slot_taken());
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        appointment_id = %appointment.id,
        patient_id = %patient_id,
        doctor_id = %new.doctor_id,
        date = %date,
        time = %time,
        "Appointment booked"
    );
    Ok(appointment)
}

/// A patient's appointments, upcoming ones soonest first, then past ones.
pub fn get_user_appointments(
    conn: &Connection,
    patient_id: &Uuid,
    today: NaiveDate,
) -> Result<Vec<AppointmentView>, AppointmentError> {
    if repository::get_user(conn, patient_id)?.is_none() {
        return Err(AppointmentError::NotFound(format!("patient {patient_id}")));
    }
    Ok(repository::get_user_appointments(conn, patient_id, &today)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::User;

    fn insert_user(conn: &Connection, name: &str, role: UserRole) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            role,
            created_at: repository::now_timestamp(),
        };
        repository::insert_user(conn, &user).unwrap();
        user.id
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn booking(doctor_id: Uuid, date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            doctor_id,
            department: "cardiology".into(),
            date: date.into(),
            time: time.into(),
        }
    }

    #[test]
    fn slot_forms_normalize() {
        assert_eq!(normalize_slot("09:00").unwrap(), "09:00");
        assert_eq!(normalize_slot("9:30").unwrap(), "09:30");
        assert_eq!(normalize_slot("02:30 PM").unwrap(), "14:30");
        assert_eq!(normalize_slot(" 04:30 pm ").unwrap(), "16:30");
        assert_eq!(normalize_slot("12:00 PM").unwrap(), "12:00");
    }

    #[test]
    fn malformed_or_off_hours_slots_rejected() {
        for raw in ["", "noon", "25:00", "10:15", "08:30", "17:00", "09:00 XM", "10:00:00"] {
            assert!(
                matches!(normalize_slot(raw), Err(AppointmentError::InvalidSlot(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn department_is_canonicalized() {
        assert_eq!(normalize_department(" internal medicine ").unwrap(), "Internal Medicine");
        assert!(matches!(
            normalize_department("Astrology"),
            Err(AppointmentError::Validation(_))
        ));
    }

    #[test]
    fn dates_validated_against_today() {
        assert_eq!(
            parse_appointment_date("2024-06-01", today()).unwrap(),
            today()
        );
        assert!(matches!(
            parse_appointment_date("2024-05-31", today()),
            Err(AppointmentError::Validation(_))
        ));
        for raw in ["2024-02-30", "01/06/2024", "tomorrow"] {
            assert!(matches!(
                parse_appointment_date(raw, today()),
                Err(AppointmentError::InvalidDate(_))
            ));
        }
    }

    #[test]
    fn booking_is_pending_and_normalized() {
        let conn = open_memory_database().unwrap();
        let patient = insert_user(&conn, "Anil Rao", UserRole::Patient);
        let doctor = insert_user(&conn, "Dr Iyer", UserRole::Doctor);

        let appt =
            create_appointment(&conn, &patient, &booking(doctor, "2024-06-03", "10:30 AM"), today())
                .unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.department, "Cardiology");
        assert_eq!(appt.time, "10:30");
        assert_eq!(
            repository::get_appointment(&conn, &appt.id).unwrap(),
            Some(appt)
        );
    }

    #[test]
    fn booking_requires_existing_doctor() {
        let conn = open_memory_database().unwrap();
        let patient = insert_user(&conn, "Anil Rao", UserRole::Patient);
        let nurse = insert_user(&conn, "Nurse Joy", UserRole::Staff);

        assert!(matches!(
            create_appointment(&conn, &patient, &booking(nurse, "2024-06-03", "10:00"), today()),
            Err(AppointmentError::NotADoctor(_))
        ));
        assert!(matches!(
            create_appointment(
                &conn,
                &patient,
                &booking(Uuid::new_v4(), "2024-06-03", "10:00"),
                today()
            ),
            Err(AppointmentError::NotFound(_))
        ));
    }

    #[test]
    fn booking_for_unknown_patient_rejected() {
        let conn = open_memory_database().unwrap();
        let doctor = insert_user(&conn, "Dr Iyer", UserRole::Doctor);
        assert!(matches!(
            create_appointment(
                &conn,
                &Uuid::new_v4(),
                &booking(doctor, "2024-06-03", "10:00"),
                today()
            ),
            Err(AppointmentError::NotFound(_))
        ));
    }

    #[test]
    fn same_doctor_slot_cannot_be_double_booked() {
        let conn = open_memory_database().unwrap();
        let first = insert_user(&conn, "Anil Rao", UserRole::Patient);
        let second = insert_user(&conn, "Leela Das", UserRole::Patient);
        let doctor = insert_user(&conn, "Dr Iyer", UserRole::Doctor);
        let other_doctor = insert_user(&conn, "Dr Bose", UserRole::Doctor);

        create_appointment(&conn, &first, &booking(doctor, "2024-06-03", "11:00"), today()).unwrap();
        assert!(matches!(
            create_appointment(&conn, &second, &booking(doctor, "2024-06-03", "11:00 AM"), today()),
            Err(AppointmentError::SlotTaken { .. })
        ));

        create_appointment(&conn, &second, &booking(other_doctor, "2024-06-03", "11:00"), today())
            .unwrap();
        create_appointment(&conn, &second, &booking(doctor, "2024-06-03", "11:30"), today())
            .unwrap();
    }

    #[test]
    fn listing_puts_upcoming_first() {
        let conn = open_memory_database().unwrap();
        let patient = insert_user(&conn, "Anil Rao", UserRole::Patient);
        let doctor = insert_user(&conn, "Dr Iyer", UserRole::Doctor);

        let earlier_day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let past = create_appointment(
            &conn,
            &patient,
            &booking(doctor, "2024-05-25", "09:00"),
            earlier_day,
        )
        .unwrap();
        let later = create_appointment(&conn, &patient, &booking(doctor, "2024-06-10", "09:00"), today())
            .unwrap();
        let sooner = create_appointment(&conn, &patient, &booking(doctor, "2024-06-02", "15:00"), today())
            .unwrap();

        let views = get_user_appointments(&conn, &patient, today()).unwrap();
        let ids: Vec<Uuid> = views.iter().map(|v| v.appointment.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id, past.id]);
        assert!(views.iter().all(|v| v.doctor_name == "Dr Iyer"));
    }

    #[test]
    fn listing_for_unknown_patient_rejected() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            get_user_appointments(&conn, &Uuid::new_v4(), today()),
            Err(AppointmentError::NotFound(_))
        ));
    }
}
