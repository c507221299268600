//! Shared helper functions for CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::mapping::MappingTable;
use crate::ocr::{create_backend, OcrBackend};
use crate::services::{Pipeline, ScanOutcome};

/// Build the process-wide handles: mapping table and OCR backend.
pub fn init_pipeline_handles(
    settings: &Settings,
) -> anyhow::Result<(MappingTable, Box<dyn OcrBackend>)> {
    let mapping = MappingTable::load_or_empty(
        &settings.mapping_file,
        &settings.mapping.sheets,
        &settings.mapping.columns,
    );
    if mapping.is_empty() {
        eprintln!(
            "{} No plate codes loaded; codes will be left empty",
            style("!").yellow()
        );
    }

    let backend = create_backend(&settings.ocr.backend, settings.ocr.backend_config())?;
    if !backend.is_available() {
        anyhow::bail!(
            "OCR backend '{}' is not available: {}",
            backend.backend_type(),
            backend.availability_hint()
        );
    }
    Ok((mapping, backend))
}

/// Run the scan pipeline off the async runtime, with a spinner.
pub async fn scan_with_spinner(
    settings: &Settings,
    image1: PathBuf,
    image2: Option<PathBuf>,
) -> anyhow::Result<ScanOutcome> {
    let (mapping, backend) = init_pipeline_handles(settings)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Running {} OCR...", backend.backend_type()));

    let outcome = tokio::task::spawn_blocking(move || {
        Pipeline::new(&mapping, backend.as_ref()).scan(Some(&image1), image2.as_deref())
    })
    .await?;

    pb.finish_and_clear();
    Ok(outcome)
}

/// Format an optional value for display.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => style("-").dim().to_string(),
    }
}
