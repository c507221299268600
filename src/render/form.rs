//! The human-editable entry form that sits between OCR and rendering.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MergedRecord;

/// `PLATE` or `PLATE(CODE)` with nothing else in the entry.
static PLATE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([A-Z0-9-]+)\s*(?:[(（]\d+[)）])?$").unwrap());

/// Digits in half or full-width parentheses anywhere in the entry.
static CODE_IN_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（](\d+)[)）]").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Values as the operator sees and edits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportForm {
    /// Plate as typed, optionally with its code: `KEL-0283(112)`.
    pub plate_entry: String,
    pub address: String,
    pub date: String,
}

/// Final values used to fill a template and name the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFields {
    pub plate: String,
    pub address: String,
    pub date: String,
    pub code: Option<String>,
}

impl ReportForm {
    /// Pre-fill the form from a merged OCR record.
    pub fn prefill(record: &MergedRecord) -> Self {
        Self {
            plate_entry: record.plate_display().unwrap_or_default(),
            address: record.address.clone().unwrap_or_default(),
            date: record.date.clone().unwrap_or_default(),
        }
    }

    /// Override fields that were supplied explicitly.
    pub fn apply_overrides(
        &mut self,
        plate_entry: Option<String>,
        address: Option<String>,
        date: Option<String>,
    ) {
        if let Some(plate_entry) = plate_entry {
            self.plate_entry = plate_entry;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(date) = date {
            self.date = date;
        }
    }

    pub fn resolve(&self) -> Result<ReportFields, FormError> {
        let entry = self.plate_entry.trim();
        let plate = match PLATE_ENTRY.captures(entry) {
            Some(caps) => caps[1].to_uppercase(),
            None => entry.to_string(),
        };
        let code = CODE_IN_ENTRY.captures(entry).map(|caps| caps[1].to_string());

        let address = self.address.trim();
        let date = self.date.trim();

        if plate.is_empty() {
            return Err(FormError::MissingField("plate"));
        }
        if address.is_empty() {
            return Err(FormError::MissingField("address"));
        }
        if date.is_empty() {
            return Err(FormError::MissingField("date"));
        }

        Ok(ReportFields {
            plate,
            address: address.to_string(),
            date: date.to_string(),
            code,
        })
    }
}
