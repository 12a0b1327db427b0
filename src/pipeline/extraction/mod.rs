pub mod acquire;
pub mod format;
pub mod sanitize;
pub mod types;

pub use acquire::*;
pub use format::*;
pub use sanitize::*;
pub use types::*;

use thiserror::Error;

/// Failures while turning an uploaded file into report text.
///
/// These are never "zero findings": a caller that gets one of these must not
/// run the prediction engine on a placeholder.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error("PDF text extraction is not available, upload an image or text file")]
    PdfTextUnavailable,

    #[error("No OCR engine configured for image uploads")]
    OcrUnavailable,

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Document contains no readable text")]
    EmptyDocument,
}
