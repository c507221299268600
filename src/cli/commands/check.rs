//! Check command: OCR backends, mapping workbook and templates.

use console::style;

use crate::config::Settings;
use crate::models::TruckType;
use crate::ocr::{OcrBackend, TesseractBackend};

pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("truckdoc Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("OCR Backends:").cyan());

    let tesseract = TesseractBackend::with_config(settings.ocr.backend_config());
    let tesseract_status = if tesseract.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", "Tesseract", tesseract_status);
    if !tesseract.is_available() {
        println!(
            "                  {}",
            style(tesseract.availability_hint()).dim()
        );
    }

    #[cfg(feature = "ocr-paddle")]
    {
        use crate::ocr::PaddleBackend;
        let paddle = PaddleBackend::with_config(settings.ocr.backend_config());
        let paddle_status = if paddle.is_available() {
            style("✓ available").green()
        } else {
            style("○ models will auto-download").yellow()
        };
        println!("  {:<15} {}", "PaddleOCR", paddle_status);
        if !paddle.is_available() {
            println!("                  {}", style(paddle.availability_hint()).dim());
        }
    }
    #[cfg(not(feature = "ocr-paddle"))]
    println!(
        "  {:<15} {}",
        "PaddleOCR",
        style("not compiled (enable ocr-paddle feature)").dim()
    );

    println!(
        "  {:<15} {} ({})",
        "Configured",
        style(&settings.ocr.backend).green(),
        settings.ocr.language
    );

    println!("\n{}", style("Files:").cyan());
    let mut all_found = print_file("Mapping", &settings.mapping_file);
    for truck in TruckType::ALL {
        let path = settings.templates_dir.join(truck.template_filename());
        all_found &= print_file(truck.label(), &path);
    }

    println!();
    if all_found {
        println!("{} Ready to generate reports", style("✓").green());
    } else {
        println!(
            "{} Some files are missing; run 'truckdoc init' to create starter templates",
            style("!").yellow()
        );
    }

    Ok(())
}

fn print_file(label: &str, path: &std::path::Path) -> bool {
    let found = path.is_file();
    let status = if found {
        style("✓ found").green()
    } else {
        style("✗ not found").red()
    };
    println!("  {:<15} {} {}", label, status, style(path.display()).dim());
    found
}
