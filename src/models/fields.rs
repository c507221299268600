//! Structured fields produced by extraction and merging.

use serde::{Deserialize, Serialize};

/// Candidate fields parsed from one photograph.
///
/// `None` means "not found". A source that failed carries only `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractedFields {
    /// A result for a source that could not be processed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Plate with its code in parentheses when both are known.
    pub fn plate_display(&self) -> Option<String> {
        plate_display(self.plate.as_deref(), self.code.as_deref())
    }
}

/// The single record combining up to two extraction attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub address: Option<String>,
    pub date: Option<String>,
    pub plate: Option<String>,
    pub code: Option<String>,
}

impl MergedRecord {
    pub fn plate_display(&self) -> Option<String> {
        plate_display(self.plate.as_deref(), self.code.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.date.is_none() && self.plate.is_none() && self.code.is_none()
    }
}

impl From<&ExtractedFields> for MergedRecord {
    fn from(fields: &ExtractedFields) -> Self {
        Self {
            address: non_empty(&fields.address),
            date: non_empty(&fields.date),
            plate: non_empty(&fields.plate),
            code: non_empty(&fields.code),
        }
    }
}

/// Treat empty strings the same as absent values.
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn plate_display(plate: Option<&str>, code: Option<&str>) -> Option<String> {
    let plate = plate.filter(|p| !p.is_empty())?;
    Some(match code.filter(|c| !c.is_empty()) {
        Some(code) => format!("{}({})", plate, code),
        None => plate.to_string(),
    })
}
