use std::path::Path;

use mime_guess::mime;
use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Broad file categories we handle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Pdf,
    Image,
    PlainText,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Result of format detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatDetection {
    pub mime_type: String,
    pub category: FileCategory,
    pub file_size_bytes: u64,
}

/// Reject uploads over the size policy before any parsing happens.
pub fn check_upload_size(size_bytes: u64, max_bytes: u64) -> Result<(), ExtractionError> {
    if size_bytes > max_bytes {
        return Err(ExtractionError::FileTooLarge {
            size_mb: size_bytes as f64 / (1024.0 * 1024.0),
            max_mb: max_bytes / (1024 * 1024),
        });
    }
    Ok(())
}

/// Detect file format from magic bytes first, the declared file name second.
/// A renamed JPEG is still a JPEG.
pub fn detect_format(bytes: &[u8], file_name: &str) -> FormatDetection {
    let file_size_bytes = bytes.len() as u64;

    let (mime_type, category) = match bytes {
        [0x25, 0x50, 0x44, 0x46, ..] => ("application/pdf".to_string(), FileCategory::Pdf),
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg".to_string(), FileCategory::Image),
        [0x89, 0x50, 0x4E, 0x47, ..] => ("image/png".to_string(), FileCategory::Image),
        [0x47, 0x49, 0x46, 0x38, ..] => ("image/gif".to_string(), FileCategory::Image),
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => {
            ("image/tiff".to_string(), FileCategory::Image)
        }
        _ if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" => {
            ("image/webp".to_string(), FileCategory::Image)
        }
        _ if is_likely_text(bytes) => ("text/plain".to_string(), FileCategory::PlainText),
        _ => guess_from_name(file_name),
    };

    FormatDetection {
        mime_type,
        category,
        file_size_bytes,
    }
}

/// Fallback for content without a recognizable signature.
fn guess_from_name(file_name: &str) -> (String, FileCategory) {
    let Some(guess) = mime_guess::from_path(file_name).first() else {
        return ("application/octet-stream".to_string(), FileCategory::Unsupported);
    };

    let category = if guess.type_() == mime::IMAGE {
        FileCategory::Image
    } else if guess.type_() == mime::TEXT {
        FileCategory::PlainText
    } else if guess.subtype() == mime::PDF {
        FileCategory::Pdf
    } else {
        FileCategory::Unsupported
    };

    (guess.essence_str().to_string(), category)
}

/// Valid UTF-8 with at least 80% printable characters (or whitespace).
fn is_likely_text(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(4096)];
    if head.is_empty() {
        return false;
    }

    // A multi-byte sequence may be cut at the 4096 boundary
    let text = match std::str::from_utf8(head) {
        Ok(t) => t,
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return false,
    };

    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable as f64 / total as f64 > 0.80
}

/// Strip path components from a filename and cap its length.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}

/// Lowercase extension of a file name, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}
