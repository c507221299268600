//! Field extraction and template rendering for truck inspection reports.
//!
//! The pipeline runs leaf-first:
//!
//! 1. [`mapping::MappingTable`] is loaded once from the plate workbook.
//! 2. [`services::extract_from_image`] turns each photograph into
//!    [`models::ExtractedFields`] through an [`ocr::OcrBackend`].
//! 3. [`services::merge_fields`] combines the two results into a
//!    [`models::MergedRecord`], which pre-fills a [`render::ReportForm`].
//! 4. [`render::ReportGenerator`] fills the selected template and saves it.

pub mod cli;
pub mod config;
pub mod docx;
pub mod mapping;
pub mod models;
pub mod ocr;
pub mod render;
pub mod services;
