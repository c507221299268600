//! Field extraction, merging and the scan pipeline.

pub mod extraction;
pub mod merge;
pub mod pipeline;

pub use extraction::{extract_fields, extract_from_image};
pub use merge::merge_fields;
pub use pipeline::{Pipeline, ScanOutcome};
