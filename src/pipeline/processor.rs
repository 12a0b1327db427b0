//! Report processing orchestrator.
//!
//! Single entry point that drives an upload through the pipeline:
//! size check → acquire text → predict → store file → save report.
//!
//! OCR and file storage are injected as traits so the orchestrator stays
//! testable with mock implementations.

use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::Report;
use crate::pipeline::extraction::{
    acquire_text, check_upload_size, AcquiredText, ExtractionError, OcrEngine, Upload,
};
use crate::pipeline::prediction::{predict, PredictionResult};
use crate::pipeline::storage::{FileStore, StorageError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while processing a report.
///
/// None of these mean "no findings": a report with no findings is an `Ok`
/// outcome with an empty prediction.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Unknown user: {0}")]
    UnknownUser(Uuid),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Extraction stage summary.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    pub method: String,
    pub mime_type: String,
    pub confidence: f32,
    pub text_length: usize,
}

impl From<&AcquiredText> for ExtractionSummary {
    fn from(acquired: &AcquiredText) -> Self {
        Self {
            method: format!("{:?}", acquired.method),
            mime_type: acquired.format.mime_type.clone(),
            confidence: acquired.confidence,
            text_length: acquired.text.len(),
        }
    }
}

/// Prediction without persistence.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPreview {
    pub extraction: ExtractionSummary,
    pub prediction: PredictionResult,
}

/// Summary returned after a report has been analyzed and saved.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    pub report: Report,
    pub extraction: ExtractionSummary,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct ReportProcessor {
    ocr: Box<dyn OcrEngine + Send + Sync>,
    store: Box<dyn FileStore + Send + Sync>,
    max_upload_bytes: u64,
}

impl ReportProcessor {
    pub fn new(
        ocr: Box<dyn OcrEngine + Send + Sync>,
        store: Box<dyn FileStore + Send + Sync>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            ocr,
            store,
            max_upload_bytes,
        }
    }

    /// Acquire text and predict, nothing is written anywhere.
    pub fn preview(&self, upload: &Upload) -> Result<AnalysisPreview, ProcessingError> {
        check_upload_size(upload.size_bytes(), self.max_upload_bytes)?;
        let acquired = acquire_text(upload, self.ocr.as_ref())?;
        let prediction = predict(&acquired.text);

        Ok(AnalysisPreview {
            extraction: ExtractionSummary::from(&acquired),
            prediction,
        })
    }

    /// Full pipeline for a user's upload.
    ///
    /// 1. Reject oversized uploads and unknown users
    /// 2. Acquire text (OCR / plain text)
    /// 3. Predict diseases, vitals and medications
    /// 4. Store the original file
    /// 5. Insert the report row (the stored file is removed if this fails)
    pub fn analyze_medical_report(
        &self,
        conn: &Connection,
        upload: &Upload,
        user_id: &Uuid,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        check_upload_size(upload.size_bytes(), self.max_upload_bytes)?;

        if repository::get_user(conn, user_id)?.is_none() {
            return Err(ProcessingError::UnknownUser(*user_id));
        }

        tracing::info!(
            user_id = %user_id,
            file_name = %upload.file_name,
            "Processing: starting extraction"
        );
        let acquired = acquire_text(upload, self.ocr.as_ref())?;

        let prediction = predict(&acquired.text);
        tracing::info!(
            user_id = %user_id,
            diseases = prediction.diseases.len(),
            vitals = prediction.vitals.len(),
            confidence = prediction.confidence,
            "Processing: prediction complete"
        );

        let file_url = self.store.store(user_id, &upload.file_name, &upload.bytes)?;

        let report = Report {
            id: Uuid::new_v4(),
            user_id: *user_id,
            file_name: upload.file_name.clone(),
            file_url,
            prediction,
            created_at: repository::now_timestamp(),
        };

        if let Err(e) = repository::insert_report(conn, &report) {
            if let Err(cleanup) = self.store.remove(&report.file_url) {
                tracing::warn!(
                    file_url = %report.file_url,
                    error = %cleanup,
                    "Failed to remove stored file after insert failure"
                );
            }
            return Err(e.into());
        }

        tracing::info!(report_id = %report.id, user_id = %user_id, "Report saved");

        Ok(ProcessingOutcome {
            extraction: ExtractionSummary::from(&acquired),
            report,
        })
    }

    /// Delete one of a user's reports and its stored file.
    ///
    /// A report owned by someone else is reported as not found.
    pub fn delete_report(
        &self,
        conn: &Connection,
        report_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<(), ProcessingError> {
        let report = repository::get_report(conn, report_id)?
            .filter(|r| r.user_id == *user_id)
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "Report".into(),
                id: report_id.to_string(),
            })?;

        repository::delete_report(conn, &report.id)?;
        if let Err(e) = self.store.remove(&report.file_url) {
            tracing::warn!(
                report_id = %report.id,
                file_url = %report.file_url,
                error = %e,
                "Report deleted but its file could not be removed"
            );
        }

        tracing::info!(report_id = %report.id, user_id = %user_id, "Report deleted");
        Ok(())
    }
}

/// A user's reports, newest first.
pub fn get_user_reports(conn: &Connection, user_id: &Uuid) -> Result<Vec<Report>, ProcessingError> {
    Ok(repository::get_user_reports(conn, user_id)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
