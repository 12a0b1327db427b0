use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::*;

type AppointmentRow = (String, String, String, String, String, String, String, String);

const APPOINTMENT_COLUMNS: &str =
    "a.id, a.patient_id, a.doctor_id, a.department, a.date, a.time, a.status, a.created_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, department, date, time,
         status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.to_string(),
            appt.department,
            appt.date.format(DATE_FORMAT).to_string(),
            appt.time,
            appt.status.as_str(),
            format_datetime(&appt.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments a WHERE a.id = ?1"),
            params![id.to_string()],
            appointment_row,
        )
        .optional()?;

    row.map(appointment_from_row).transpose()
}

/// Whether a doctor already has a live (not cancelled) booking in a slot.
pub fn is_slot_taken(
    conn: &Connection,
    doctor_id: &Uuid,
    date: &NaiveDate,
    time: &str,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE doctor_id = ?1 AND date = ?2 AND time = ?3 AND status != 'cancelled'",
        params![doctor_id.to_string(), date.format(DATE_FORMAT).to_string(), time],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// A patient's appointments: upcoming (on or after `today`) soonest first,
/// then past ones most recent first.
pub fn get_user_appointments(
    conn: &Connection,
    patient_id: &Uuid,
    today: &NaiveDate,
) -> Result<Vec<AppointmentView>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS}, u.name
         FROM appointments a
         LEFT JOIN users u ON u.id = a.doctor_id
         WHERE a.patient_id = ?1
         ORDER BY (a.date < ?2),
                  CASE WHEN a.date >= ?2 THEN a.date || ' ' || a.time END ASC,
                  a.date || ' ' || a.time DESC"
    ))?;

    let rows = stmt.query_map(
        params![patient_id.to_string(), today.format(DATE_FORMAT).to_string()],
        |row| Ok((appointment_row(row)?, row.get::<_, Option<String>>(8)?)),
    )?;

    let mut views = Vec::new();
    for row in rows {
        let (base, doctor_name) = row?;
        views.push(AppointmentView {
            appointment: appointment_from_row(base)?,
            doctor_name: doctor_name.unwrap_or_default(),
        });
    }
    Ok(views)
}

fn appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (id, patient_id, doctor_id, department, date, time, status, created_at) = row;
    Ok(Appointment {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: parse_uuid(&doctor_id)?,
        department,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid date column: {e}")))?,
        time,
        status: AppointmentStatus::from_str(&status)?,
        created_at: parse_datetime(&created_at),
    })
}
