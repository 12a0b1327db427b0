use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;
use crate::pipeline::prediction::{PredictionResult, VitalMap};

type ReportRow = (String, String, String, String, String, String, String, f64, String);

const REPORT_COLUMNS: &str = "id, user_id, file_name, file_url, diseases, vitals, suggested_meds,
     confidence, created_at";

/// Insert a report. Prediction lists and vitals are stored as JSON text.
pub fn insert_report(conn: &Connection, report: &Report) -> Result<(), DatabaseError> {
    let prediction = &report.prediction;
    let diseases_json =
        serde_json::to_string(&prediction.diseases).unwrap_or_else(|_| "[]".to_string());
    let vitals_json =
        serde_json::to_string(&prediction.vitals).unwrap_or_else(|_| "{}".to_string());
    let meds_json =
        serde_json::to_string(&prediction.suggested_meds).unwrap_or_else(|_| "[]".to_string());

    conn.execute(
        "INSERT INTO reports (id, user_id, file_name, file_url, diseases, vitals,
         suggested_meds, confidence, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            report.id.to_string(),
            report.user_id.to_string(),
            report.file_name,
            report.file_url,
            diseases_json,
            vitals_json,
            meds_json,
            prediction.confidence,
            format_datetime(&report.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_report(conn: &Connection, id: &Uuid) -> Result<Option<Report>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
            params![id.to_string()],
            report_row,
        )
        .optional()?;

    row.map(report_from_row).transpose()
}

/// All reports uploaded by a user, newest first.
pub fn get_user_reports(conn: &Connection, user_id: &Uuid) -> Result<Vec<Report>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports
         WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
    ))?;

    let rows = stmt.query_map(params![user_id.to_string()], report_row)?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(report_from_row(row?)?);
    }
    Ok(reports)
}

pub fn delete_report(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM reports WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Report".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn report_from_row(row: ReportRow) -> Result<Report, DatabaseError> {
    let (
        id, user_id, file_name, file_url, diseases_json,
        vitals_json, meds_json, confidence, created_at,
    ) = row;

    let diseases: Vec<String> = serde_json::from_str(&diseases_json)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid diseases column: {e}")))?;
    let vitals: VitalMap = serde_json::from_str(&vitals_json)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid vitals column: {e}")))?;
    let suggested_meds: Vec<String> = serde_json::from_str(&meds_json).map_err(|e| {
        DatabaseError::ConstraintViolation(format!("Invalid suggested_meds column: {e}"))
    })?;

    Ok(Report {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        file_name,
        file_url,
        prediction: PredictionResult {
            diseases,
            vitals,
            suggested_meds,
            confidence,
        },
        created_at: parse_datetime(&created_at),
    })
}
