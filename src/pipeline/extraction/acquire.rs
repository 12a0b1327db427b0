//! Text acquisition: uploaded file → report text.
//!
//! - `Image`: delegated to the injected `OcrEngine`
//! - `PlainText`: strict UTF-8 read
//! - `Pdf`: refused with `PdfTextUnavailable`, never a placeholder string
//! - anything else: `UnsupportedFileType`

use super::format::{detect_format, FileCategory};
use super::sanitize::sanitize_extracted_text;
use super::types::{AcquiredText, ExtractionMethod, OcrEngine, Upload};
use super::ExtractionError;

/// Tesseract-style language code passed to OCR engines.
pub const DEFAULT_OCR_LANG: &str = "eng";

/// Confidence assigned to text read directly from a text file.
const PLAIN_TEXT_CONFIDENCE: f32 = 0.99;

/// Acquire sanitized report text from an upload.
pub fn acquire_text(upload: &Upload, ocr: &dyn OcrEngine) -> Result<AcquiredText, ExtractionError> {
    let format = detect_format(&upload.bytes, &upload.file_name);

    tracing::info!(
        file_name = %upload.file_name,
        category = format.category.as_str(),
        mime = %format.mime_type,
        size = format.file_size_bytes,
        "Acquiring report text"
    );

    let (method, raw_text, confidence) = match format.category {
        FileCategory::Image => {
            let page = ocr.ocr_image(&upload.bytes, DEFAULT_OCR_LANG)?;
            (ExtractionMethod::Ocr, page.text, page.confidence.clamp(0.0, 1.0))
        }
        FileCategory::PlainText => {
            let text = String::from_utf8(upload.bytes.clone())
                .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
            (ExtractionMethod::PlainTextRead, text, PLAIN_TEXT_CONFIDENCE)
        }
        FileCategory::Pdf => return Err(ExtractionError::PdfTextUnavailable),
        FileCategory::Unsupported => {
            return Err(ExtractionError::UnsupportedFileType(format.mime_type))
        }
    };

    let text = sanitize_extracted_text(&raw_text);
    if text.is_empty() {
        tracing::warn!(file_name = %upload.file_name, method = ?method, "No readable text acquired");
        return Err(ExtractionError::EmptyDocument);
    }

    tracing::info!(
        method = ?method,
        confidence,
        text_length = text.len(),
        "Text acquisition complete"
    );

    Ok(AcquiredText {
        method,
        format,
        text,
        confidence,
    })
}
