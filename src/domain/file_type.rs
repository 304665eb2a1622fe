//! Byte-prefix file-type sniffing.
//!
//! Detection is an ordered rule table: binary signatures first, then text
//! heuristics over the first 100 bytes, then plain text. The first matching
//! rule wins and `detect` never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Bytes inspected by the text heuristics.
pub const TEXT_SAMPLE_LEN: usize = 100;

/// Inputs shorter than the signature header are not classified.
pub const MIN_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Pdf,
    Text,
    Code,
    Json,
    Archive,
    Unknown,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Text => "text",
            FileCategory::Code => "code",
            FileCategory::Json => "json",
            FileCategory::Archive => "archive",
            FileCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedFileType {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub category: FileCategory,
}

impl DetectedFileType {
    const fn new(mime_type: &'static str, extension: &'static str, category: FileCategory) -> Self {
        Self {
            mime_type,
            extension,
            category,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self.category,
            FileCategory::Text | FileCategory::Code | FileCategory::Json
        )
    }
}

impl Default for DetectedFileType {
    fn default() -> Self {
        UNKNOWN
    }
}

pub const UNKNOWN: DetectedFileType =
    DetectedFileType::new("application/octet-stream", "bin", FileCategory::Unknown);
pub const PLAIN_TEXT: DetectedFileType =
    DetectedFileType::new("text/plain", "txt", FileCategory::Text);

/// Magic numbers checked against the start of the buffer.
const SIGNATURES: &[(&[u8], DetectedFileType)] = &[
    (
        &[0xFF, 0xD8],
        DetectedFileType::new("image/jpeg", "jpg", FileCategory::Image),
    ),
    (
        &[0x89, 0x50, 0x4E, 0x47],
        DetectedFileType::new("image/png", "png", FileCategory::Image),
    ),
    (
        &[0x47, 0x49, 0x46],
        DetectedFileType::new("image/gif", "gif", FileCategory::Image),
    ),
    (
        &[0x25, 0x50, 0x44, 0x46],
        DetectedFileType::new("application/pdf", "pdf", FileCategory::Pdf),
    ),
    (
        &[0x50, 0x4B, 0x03, 0x04],
        DetectedFileType::new("application/zip", "zip", FileCategory::Archive),
    ),
];

enum TextMatch {
    Contains(&'static [&'static str]),
    Pattern(Regex),
}

impl TextMatch {
    fn pattern(re: &str) -> Self {
        // Patterns are literals below; failing to compile one is a programming error.
        TextMatch::Pattern(Regex::new(re).expect("file-type pattern must compile"))
    }

    fn matches(&self, sample: &str) -> bool {
        match self {
            TextMatch::Contains(needles) => needles.iter().any(|n| sample.contains(n)),
            TextMatch::Pattern(re) => re.is_match(sample),
        }
    }
}

static TEXT_RULES: LazyLock<Vec<(TextMatch, DetectedFileType)>> = LazyLock::new(|| {
    vec![
        (
            TextMatch::Contains(&["<?xml"]),
            DetectedFileType::new("application/xml", "xml", FileCategory::Code),
        ),
        (
            TextMatch::Contains(&["<?php"]),
            DetectedFileType::new("application/x-php", "php", FileCategory::Code),
        ),
        (
            TextMatch::Contains(&["<!DOCTYPE html", "<html"]),
            DetectedFileType::new("text/html", "html", FileCategory::Code),
        ),
        (
            TextMatch::pattern(r#"^\{\s*""#),
            DetectedFileType::new("application/json", "json", FileCategory::Json),
        ),
        (
            TextMatch::pattern(r"(?im)^(import|package)\s+[a-z]"),
            DetectedFileType::new("text/x-java", "java", FileCategory::Code),
        ),
        (
            TextMatch::pattern(r"(?m)^(const|let|var|function|class|import)\s+"),
            DetectedFileType::new("application/javascript", "js", FileCategory::Code),
        ),
        (
            TextMatch::pattern(r"^(#include|#define|\s*int\s+main)"),
            DetectedFileType::new("text/x-c", "c", FileCategory::Code),
        ),
        (
            TextMatch::pattern(r"(?m)^(def\s+|class\s+|import\s+|from\s+.*import)"),
            DetectedFileType::new("text/x-python", "py", FileCategory::Code),
        ),
    ]
});

fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0D | 0x20..=0x7E)
}

/// Classifies `data` by its leading bytes.
pub fn detect(data: &[u8]) -> DetectedFileType {
    if data.len() < MIN_HEADER_LEN {
        return UNKNOWN;
    }

    if let Some((_, detected)) = SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
    {
        return *detected;
    }

    let sample = &data[..data.len().min(TEXT_SAMPLE_LEN)];
    if !sample.iter().copied().all(is_printable) {
        return UNKNOWN;
    }
    // Printable ASCII is always valid UTF-8.
    let Ok(text) = std::str::from_utf8(sample) else {
        return UNKNOWN;
    };

    TEXT_RULES
        .iter()
        .find(|(rule, _)| rule.matches(text))
        .map(|(_, detected)| *detected)
        .unwrap_or(PLAIN_TEXT)
}
