//! Scan command: OCR, extract and merge without rendering.

use std::path::PathBuf;

use console::style;

use crate::config::Settings;
use crate::models::ExtractedFields;
use crate::render::ReportForm;

use super::helpers::{or_dash, scan_with_spinner};

pub async fn cmd_scan(
    settings: &Settings,
    image1: PathBuf,
    image2: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = scan_with_spinner(settings, image1, image2).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for (label, result) in [("Photo 1", &outcome.first), ("Photo 2", &outcome.second)] {
        if let Some(fields) = result {
            print_fields(label, fields);
        }
    }

    let form = ReportForm::prefill(&outcome.merged);
    println!("\n{}", style("Pre-fill").bold());
    println!("  {:<10} {}", "Plate", or_dash(Some(form.plate_entry.as_str())));
    println!("  {:<10} {}", "Address", or_dash(Some(form.address.as_str())));
    println!("  {:<10} {}", "Date", or_dash(Some(form.date.as_str())));

    Ok(())
}

fn print_fields(label: &str, fields: &ExtractedFields) {
    println!("\n{}", style(label).cyan());
    if let Some(ref error) = fields.error {
        println!("  {} {}", style("✗").red(), error);
        return;
    }
    println!("  {:<10} {}", "Plate", or_dash(fields.plate.as_deref()));
    println!("  {:<10} {}", "Code", or_dash(fields.code.as_deref()));
    println!("  {:<10} {}", "Address", or_dash(fields.address.as_deref()));
    println!("  {:<10} {}", "Date", or_dash(fields.date.as_deref()));
}
