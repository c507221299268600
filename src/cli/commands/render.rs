//! Render command: pre-fill from OCR, apply overrides, generate the report.

use std::path::PathBuf;

use console::style;

use crate::config::Settings;
use crate::render::{ReportForm, ReportGenerator, ReportRequest};
use crate::services::ScanOutcome;

use super::helpers::scan_with_spinner;

pub struct RenderArgs {
    pub image1: PathBuf,
    pub image2: PathBuf,
    pub plate: Option<String>,
    pub address: Option<String>,
    pub date: Option<String>,
    pub truck_type: String,
    pub no_ocr: bool,
}

pub async fn cmd_render(settings: &Settings, args: RenderArgs) -> anyhow::Result<()> {
    let mut form = if args.no_ocr {
        ReportForm::default()
    } else {
        prefill_from_scan(
            scan_with_spinner(settings, args.image1.clone(), Some(args.image2.clone())).await,
        )
    };
    form.apply_overrides(args.plate, args.address, args.date);

    let fields = form.resolve()?;
    if fields.code.is_none() {
        eprintln!(
            "{} No code in plate entry '{}'; using XXX in the file name",
            style("!").yellow(),
            form.plate_entry.trim()
        );
    }

    let request = ReportRequest {
        fields,
        truck_type: args.truck_type,
        image1: Some(args.image1),
        image2: Some(args.image2),
    };
    let generator = ReportGenerator::from_settings(settings);
    let outcome = tokio::task::spawn_blocking(move || generator.generate(&request)).await??;

    for issue in &outcome.issues {
        eprintln!("{} {}", style("!").yellow(), issue);
    }
    println!(
        "{} Report written to {}",
        style("✓").green(),
        outcome.path.display()
    );

    Ok(())
}

/// Pre-fill the form from a scan. OCR only suggests values, so a scan that
/// could not run leaves the form empty for the overrides to fill.
fn prefill_from_scan(scan: anyhow::Result<ScanOutcome>) -> ReportForm {
    let outcome = match scan {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("OCR pre-fill skipped: {:#}", e);
            eprintln!(
                "{} OCR unavailable ({:#}); starting from an empty form",
                style("!").yellow(),
                e
            );
            return ReportForm::default();
        }
    };

    for (label, result) in [("photo 1", &outcome.first), ("photo 2", &outcome.second)] {
        if let Some(error) = result.as_ref().and_then(|r| r.error.as_deref()) {
            eprintln!("{} OCR of {} failed: {}", style("!").yellow(), label, error);
        }
    }
    ReportForm::prefill(&outcome.merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergedRecord;

    #[test]
    fn test_unavailable_ocr_leaves_form_empty() {
        let mut form = prefill_from_scan(Err(anyhow::anyhow!(
            "OCR backend 'tesseract' is not available"
        )));
        assert_eq!(form, ReportForm::default());

        form.apply_overrides(
            Some("KEL-0283(112)".to_string()),
            Some("中山路12號".to_string()),
            Some("113年5月2日".to_string()),
        );
        let fields = form.resolve().unwrap();
        assert_eq!(fields.plate, "KEL-0283");
        assert_eq!(fields.code.as_deref(), Some("112"));
    }

    #[test]
    fn test_scan_outcome_prefills_form() {
        let outcome = ScanOutcome {
            merged: MergedRecord {
                address: Some("中山路12號".to_string()),
                date: Some("113年5月2日".to_string()),
                plate: Some("KEL-0283".to_string()),
                code: Some("112".to_string()),
            },
            ..Default::default()
        };

        let form = prefill_from_scan(Ok(outcome));
        assert_eq!(form.plate_entry, "KEL-0283(112)");
        assert_eq!(form.address, "中山路12號");
    }
}
