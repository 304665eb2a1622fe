//! Turning fetched blob bytes into something a client can save or display.

use crate::domain::file_type::{self, DetectedFileType};

pub const BINARY_PREVIEW: &str = "Binary data (cannot display as text)";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A blob ready to be handed out as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub blob_id: String,
    pub file_type: DetectedFileType,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn from_bytes(blob_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        let blob_id = blob_id.into();
        let file_type = file_type::detect(&bytes);
        let filename = format!("{}.{}", blob_id, file_type.extension);
        Self {
            blob_id,
            file_type,
            filename,
            bytes,
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.file_type.mime_type
    }

    /// `Content-Disposition` value that makes browsers save the file.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Human readable size with 1024 steps, e.g. `1.5 KB`. Capped at GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// The bytes as UTF-8 text, or a placeholder for binary content.
pub fn preview_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => BINARY_PREVIEW.to_string(),
    }
}
