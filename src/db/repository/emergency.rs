use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

type EmergencyRow = (String, String, Option<String>, String, String, String);

/// Shown when the patient record is missing from the users table.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown Patient";

pub fn insert_emergency(conn: &Connection, emergency: &Emergency) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO emergencies (id, patient_id, doctor_id, condition, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            emergency.id.to_string(),
            emergency.patient_id.to_string(),
            emergency.doctor_id.map(|id| id.to_string()),
            emergency.condition,
            emergency.status.as_str(),
            format_datetime(&emergency.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_emergency(conn: &Connection, id: &Uuid) -> Result<Option<Emergency>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, doctor_id, condition, status, created_at
             FROM emergencies WHERE id = ?1",
            params![id.to_string()],
            emergency_row,
        )
        .optional()?;

    row.map(emergency_from_row).transpose()
}

/// Pending emergencies visible to a doctor: assigned to them or not yet assigned.
/// Newest first, with the patient's name attached.
pub fn get_pending_emergencies_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<EmergencyAlert>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.patient_id, e.doctor_id, e.condition, e.status, e.created_at, u.name
         FROM emergencies e
         LEFT JOIN users u ON u.id = e.patient_id
         WHERE e.status = 'pending' AND (e.doctor_id = ?1 OR e.doctor_id IS NULL)
         ORDER BY e.created_at DESC, e.rowid DESC",
    )?;

    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok((emergency_row(row)?, row.get::<_, Option<String>>(6)?))
    })?;

    let mut alerts = Vec::new();
    for row in rows {
        let (base, patient_name) = row?;
        alerts.push(EmergencyAlert {
            emergency: emergency_from_row(base)?,
            patient_name: patient_name.unwrap_or_else(|| UNKNOWN_PATIENT_NAME.to_string()),
        });
    }
    Ok(alerts)
}

/// Mark a pending emergency acknowledged by `doctor_id`.
/// Returns the number of rows changed: 0 when it was not pending.
pub fn acknowledge_emergency(
    conn: &Connection,
    id: &Uuid,
    doctor_id: &Uuid,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE emergencies SET status = 'acknowledged', doctor_id = ?1
         WHERE id = ?2 AND status = 'pending'",
        params![doctor_id.to_string(), id.to_string()],
    )?;
    Ok(updated)
}

fn emergency_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmergencyRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn emergency_from_row(row: EmergencyRow) -> Result<Emergency, DatabaseError> {
    let (id, patient_id, doctor_id, condition, status, created_at) = row;
    Ok(Emergency {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: doctor_id.as_deref().map(parse_uuid).transpose()?,
        condition,
        status: EmergencyStatus::from_str(&status)?,
        created_at: parse_datetime(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::db::repository::{insert_user, now_timestamp};
    use crate::db::sqlite::open_memory_database;

    fn add_user(conn: &Connection, name: &str, role: UserRole) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            role,
            created_at: now_timestamp(),
        };
        insert_user(conn, &user).unwrap();
        user.id
    }

    fn make_emergency(patient_id: Uuid, doctor_id: Option<Uuid>, at: &str) -> Emergency {
        Emergency {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            condition: "Severe chest pain".into(),
            status: EmergencyStatus::Pending,
            created_at: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    #[test]
    fn emergency_insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let patient = add_user(&conn, "Kiran", UserRole::Patient);
        let emergency = make_emergency(patient, None, "2024-05-01 10:00:00");
        insert_emergency(&conn, &emergency).unwrap();

        let loaded = get_emergency(&conn, &emergency.id).unwrap().unwrap();
        assert_eq!(loaded, emergency);
    }

    #[test]
    fn doctor_sees_assigned_and_unassigned_pending() {
        let conn = open_memory_database().unwrap();
        let patient = add_user(&conn, "Kiran", UserRole::Patient);
        let doctor = add_user(&conn, "Dr Shah", UserRole::Doctor);
        let other = add_user(&conn, "Dr Iyer", UserRole::Doctor);

        let unassigned = make_emergency(patient, None, "2024-05-01 10:00:00");
        let mine = make_emergency(patient, Some(doctor), "2024-05-01 11:00:00");
        let theirs = make_emergency(patient, Some(other), "2024-05-01 12:00:00");
        for e in [&unassigned, &mine, &theirs] {
            insert_emergency(&conn, e).unwrap();
        }

        let alerts = get_pending_emergencies_for_doctor(&conn, &doctor).unwrap();
        let ids: Vec<Uuid> = alerts.iter().map(|a| a.emergency.id).collect();
        assert_eq!(ids, vec![mine.id, unassigned.id]);
        assert_eq!(alerts[0].patient_name, "Kiran");
    }

    #[test]
    fn acknowledge_assigns_doctor_once() {
        let conn = open_memory_database().unwrap();
        let patient = add_user(&conn, "Kiran", UserRole::Patient);
        let doctor = add_user(&conn, "Dr Shah", UserRole::Doctor);
        let emergency = make_emergency(patient, None, "2024-05-01 10:00:00");
        insert_emergency(&conn, &emergency).unwrap();

        assert_eq!(acknowledge_emergency(&conn, &emergency.id, &doctor).unwrap(), 1);
        let loaded = get_emergency(&conn, &emergency.id).unwrap().unwrap();
        assert_eq!(loaded.status, EmergencyStatus::Acknowledged);
        assert_eq!(loaded.doctor_id, Some(doctor));

        assert_eq!(acknowledge_emergency(&conn, &emergency.id, &doctor).unwrap(), 0);
        assert!(get_pending_emergencies_for_doctor(&conn, &doctor).unwrap().is_empty());
    }
}
