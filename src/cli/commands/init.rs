//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::docx::Document;
use crate::models::TruckType;
use crate::render::placeholders::{
    ADDRESS, CHECKBOX_COMPRESSION, CHECKBOX_RECYCLING, DATE, IMAGE_1, IMAGE_2, LICENSE_PLATE,
};

/// Create the data directories and any missing starter templates.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    if let Some(parent) = settings.mapping_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    for truck in TruckType::ALL {
        let path = settings.templates_dir.join(truck.template_filename());
        if path.exists() {
            continue;
        }
        starter_template(truck, settings.report.checkboxes).save(&path)?;
        println!(
            "  {} Created starter template {}",
            style("✓").green(),
            path.display()
        );
    }

    if !settings.mapping_file.exists() {
        println!(
            "{} Mapping workbook not found at {}",
            style("!").yellow(),
            settings.mapping_file.display()
        );
        println!("  Plate codes will be left empty until it is added");
    }

    println!(
        "{} Initialized truckdoc in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}

/// A placeholder-only template. Checkbox lines are included only when
/// checkbox rendering is enabled, so every token in it gets filled.
fn starter_template(truck: TruckType, checkboxes: bool) -> Document {
    let mut lines = vec![
        format!("{}檢查報告（範本，請替換為正式 .docx 模板）", truck.label()),
        ADDRESS.to_string(),
        DATE.to_string(),
        LICENSE_PLATE.to_string(),
    ];
    if checkboxes {
        lines.push(format!("{}: {}", TruckType::Compression.label(), CHECKBOX_COMPRESSION));
        lines.push(format!("{}: {}", TruckType::Recycling.label(), CHECKBOX_RECYCLING));
    }
    lines.push(IMAGE_1.to_string());
    lines.push(IMAGE_2.to_string());
    Document::blank(lines.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;

    use crate::render::{ReportFields, ReportGenerator, ReportRequest};

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let mut bytes = Cursor::new(Vec::new());
        image::RgbImage::new(8, 6)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes.into_inner()).unwrap();
        path
    }

    fn render_starter(checkboxes: bool) -> Vec<String> {
        let dir = tempfile::TempDir::new().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        let truck = TruckType::Compression;
        starter_template(truck, checkboxes)
            .save(&templates.join(truck.template_filename()))
            .unwrap();

        let generator =
            ReportGenerator::new(&templates, dir.path().join("output")).with_checkboxes(checkboxes);
        let outcome = generator
            .generate(&ReportRequest {
                fields: ReportFields {
                    plate: "KEL-0283".to_string(),
                    address: "中山路12號".to_string(),
                    date: "113年5月2日".to_string(),
                    code: Some("112".to_string()),
                },
                truck_type: "yellow".to_string(),
                image1: Some(write_png(dir.path(), "a.png")),
                image2: Some(write_png(dir.path(), "b.png")),
            })
            .unwrap();
        assert!(outcome.issues.is_empty(), "{:?}", outcome.issues);

        Document::open(&outcome.path).unwrap().paragraph_texts()
    }

    #[test]
    fn test_starter_template_fills_completely_with_defaults() {
        let texts = render_starter(Settings::default().report.checkboxes);
        assert!(texts.iter().all(|t| !t.contains("{{")), "{:?}", texts);
        assert_eq!(&texts[1..4], ["中山路12號", "113年5月2日", "KEL-0283"]);
    }

    #[test]
    fn test_starter_template_with_checkboxes() {
        let texts = render_starter(true);
        assert!(texts.iter().all(|t| !t.contains("{{")), "{:?}", texts);
        assert!(texts.contains(&format!("{}: ■", TruckType::Compression.label())));
        assert!(texts.contains(&format!("{}: □", TruckType::Recycling.label())));
    }
}
