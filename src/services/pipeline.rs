//! Scan pipeline: OCR both photographs, extract, merge.

use std::path::Path;

use serde::Serialize;

use crate::mapping::MappingTable;
use crate::models::{ExtractedFields, MergedRecord};
use crate::ocr::OcrBackend;

use super::extraction::extract_from_image;
use super::merge::merge_fields;

/// Per-photograph results plus the merged pre-fill record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub first: Option<ExtractedFields>,
    pub second: Option<ExtractedFields>,
    pub merged: MergedRecord,
}

/// Request/response wrapper around the read-only handles built at startup.
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    mapping: &'a MappingTable,
    ocr: &'a dyn OcrBackend,
}

impl<'a> Pipeline<'a> {
    pub fn new(mapping: &'a MappingTable, ocr: &'a dyn OcrBackend) -> Self {
        Self { mapping, ocr }
    }

    /// Extract fields from one photograph.
    pub fn extract(&self, image_path: &Path) -> ExtractedFields {
        extract_from_image(self.ocr, image_path, self.mapping)
    }

    /// Extract from each supplied photograph and merge in order.
    ///
    /// Each photograph is processed independently; a failure on one is
    /// recorded in its own result and does not stop the other.
    pub fn scan(&self, first: Option<&Path>, second: Option<&Path>) -> ScanOutcome {
        let first = first.map(|p| self.extract(p));
        let second = second.map(|p| self.extract(p));

        for (label, result) in [("first", &first), ("second", &second)] {
            if let Some(ExtractedFields {
                error: Some(error), ..
            }) = result
            {
                tracing::warn!("OCR of {} photograph failed: {}", label, error);
            }
        }

        let merged = merge_fields(first.as_ref(), second.as_ref());
        ScanOutcome {
            first,
            second,
            merged,
        }
    }
}
