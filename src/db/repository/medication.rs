use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

type MedicationRow = (String, String, String, String, String, String, String);

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    let times_json = serde_json::to_string(&med.times).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO medications (id, patient_id, medicine, dosage, times, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            med.id.to_string(),
            med.patient_id.to_string(),
            med.medicine,
            med.dosage,
            times_json,
            med.status.as_str(),
            format_datetime(&med.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, medicine, dosage, times, status, created_at
             FROM medications WHERE id = ?1",
            params![id.to_string()],
            medication_row,
        )
        .optional()?;

    row.map(medication_from_row).transpose()
}

/// Active reminders for one patient, newest first.
pub fn get_active_medications(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, medicine, dosage, times, status, created_at
         FROM medications WHERE patient_id = ?1 AND status = 'active'
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], medication_row)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(meds)
}

pub fn update_medication_status(
    conn: &Connection,
    id: &Uuid,
    status: MedicationStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medications SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    let (id, patient_id, medicine, dosage, times_json, status, created_at) = row;
    Ok(Medication {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        medicine,
        dosage,
        times: serde_json::from_str(&times_json).unwrap_or_default(),
        status: MedicationStatus::from_str(&status)?,
        created_at: parse_datetime(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_user, now_timestamp};
    use crate::db::sqlite::open_memory_database;

    fn setup() -> (Connection, Uuid) {
        let conn = open_memory_database().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            name: "Meera".into(),
            email: "meera@example.org".into(),
            role: UserRole::Patient,
            created_at: now_timestamp(),
        };
        insert_user(&conn, &user).unwrap();
        (conn, user.id)
    }

    fn make_med(patient_id: Uuid, medicine: &str, times: &[&str]) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            patient_id,
            medicine: medicine.into(),
            dosage: "500mg".into(),
            times: times.iter().map(|t| t.to_string()).collect(),
            status: MedicationStatus::Active,
            created_at: now_timestamp(),
        }
    }

    #[test]
    fn medication_insert_and_retrieve() {
        let (conn, patient_id) = setup();
        let med = make_med(patient_id, "Metformin", &["08:00", "20:00"]);
        insert_medication(&conn, &med).unwrap();

        let loaded = get_medication(&conn, &med.id).unwrap().unwrap();
        assert_eq!(loaded, med);
        assert_eq!(loaded.times, vec!["08:00", "20:00"]);
    }

    #[test]
    fn active_filter_excludes_stopped() {
        let (conn, patient_id) = setup();
        let keep = make_med(patient_id, "Metformin", &["08:00"]);
        let stop = make_med(patient_id, "Amlodipine", &["09:00"]);
        insert_medication(&conn, &keep).unwrap();
        insert_medication(&conn, &stop).unwrap();

        update_medication_status(&conn, &stop.id, MedicationStatus::Stopped).unwrap();

        let active = get_active_medications(&conn, &patient_id).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].medicine, "Metformin");
    }

    #[test]
    fn active_medications_scoped_to_patient() {
        let (conn, patient_id) = setup();
        insert_medication(&conn, &make_med(patient_id, "Zinc", &["12:00"])).unwrap();
        assert!(get_active_medications(&conn, &Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn update_missing_medication_not_found() {
        let (conn, _) = setup();
        let result = update_medication_status(&conn, &Uuid::new_v4(), MedicationStatus::Stopped);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
