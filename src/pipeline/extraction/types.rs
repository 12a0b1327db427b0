use std::path::Path;

use serde::{Deserialize, Serialize};

use super::format::FormatDetection;
use super::ExtractionError;

/// A file handed to the pipeline: original name plus raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from disk, keeping only the final path component as its name.
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// How text was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Ocr,
    PlainTextRead,
}

/// Text acquired from an upload, ready for prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquiredText {
    pub method: ExtractionMethod,
    pub format: FormatDetection,
    pub text: String,
    pub confidence: f32,
}

/// Raw OCR result from the engine
#[derive(Debug, Clone)]
pub struct OcrPageResult {
    pub text: String,
    /// Mean recognition confidence in [0, 1].
    pub confidence: f32,
}

/// OCR engine abstraction. Any OCR backend can be plugged in; tests use mocks.
pub trait OcrEngine {
    fn ocr_image(&self, image_bytes: &[u8], lang: &str) -> Result<OcrPageResult, ExtractionError>;
}

/// Placeholder engine for deployments without OCR: every image upload is refused.
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn ocr_image(&self, _image_bytes: &[u8], _lang: &str) -> Result<OcrPageResult, ExtractionError> {
        Err(ExtractionError::OcrUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cbc_results.txt");
        std::fs::write(&path, "Hemoglobin 12.1").unwrap();

        let upload = Upload::from_path(&path).unwrap();
        assert_eq!(upload.file_name, "cbc_results.txt");
        assert_eq!(upload.size_bytes(), 15);
    }

    #[test]
    fn upload_from_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Upload::from_path(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn no_ocr_refuses_images() {
        let result = NoOcr.ocr_image(&[0xFF, 0xD8, 0xFF], "eng");
        assert!(matches!(result, Err(ExtractionError::OcrUnavailable)));
    }

    #[test]
    fn extraction_method_serializes_snake_case() {
        let json = serde_json::to_string(&ExtractionMethod::PlainTextRead).unwrap();
        assert_eq!(json, "\"plain_text_read\"");
    }
}
