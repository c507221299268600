//! Field extraction from recognized text.
//!
//! Each field is found by an independent pattern search over the same block
//! of text, so the order of lines only matters for which match comes first.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::mapping::MappingTable;
use crate::models::ExtractedFields;
use crate::ocr::{OcrBackend, OcrError};

/// ROC-era date as written: `113年5月2日`, whitespace allowed between parts.
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\s*年\s*\d{1,2}\s*月\s*\d{1,2}\s*日").unwrap());

/// CJK place name, street-type marker, house number, number marker.
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{4e00}-\x{9fff}]+(?:路|街|巷|弄)\s*[\d-]+(?:號|号)").unwrap()
});

/// Letters-then-digits or digits-then-letters plate, optional `-` or space separator.
static PLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z]{2,3}[- ]?[0-9]{3,4}|[0-9]{3,4}[- ]?[A-Z]{2,3}").unwrap()
});

/// Find a date; the whole matched span is kept, era numbering untouched.
pub fn extract_date(text: &str) -> Option<String> {
    DATE_PATTERN.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_address(text: &str) -> Option<String> {
    ADDRESS_PATTERN
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

/// Find a plate and normalize it to uppercase with `-` as separator.
pub fn extract_plate(text: &str) -> Option<String> {
    PLATE_PATTERN
        .find(text)
        .map(|m| normalize_plate(m.as_str()))
}

pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase().replace(' ', "-")
}

/// Parse one block of recognized text into candidate fields.
pub fn extract_fields(text: &str, mapping: &MappingTable) -> ExtractedFields {
    let plate = extract_plate(text);
    let code = match plate.as_deref() {
        Some(plate) if !mapping.is_empty() => mapping.lookup(plate).map(str::to_string),
        _ => None,
    };

    ExtractedFields {
        address: extract_address(text),
        date: extract_date(text),
        plate,
        code,
        error: None,
    }
}

/// Run OCR on one photograph and extract its fields.
///
/// Failures are captured in the returned value's `error` field and never
/// escape, so one unreadable photograph cannot affect the other.
pub fn extract_from_image(
    ocr: &dyn OcrBackend,
    image_path: &Path,
    mapping: &MappingTable,
) -> ExtractedFields {
    if !image_path.exists() {
        return ExtractedFields::failed(format!("image file not found: {}", image_path.display()));
    }

    match ocr.ocr_image(image_path) {
        Ok(result) => {
            tracing::debug!(
                "{} recognized {} lines from {} in {}ms",
                result.backend,
                result.lines.len(),
                image_path.display(),
                result.processing_time_ms
            );
            let text = result.text();
            tracing::trace!("Recognized text:\n{}", text);
            extract_fields(&text, mapping)
        }
        Err(OcrError::ImageNotFound(path)) => {
            ExtractedFields::failed(format!("image file not found: {}", path.display()))
        }
        Err(e) => {
            tracing::warn!("OCR error on {}: {}", image_path.display(), e);
            ExtractedFields::failed(e.to_string())
        }
    }
}
