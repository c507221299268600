//! Report Generation Tests
//!
//! Drives template selection, text and image substitution and saving through
//! the public API, with templates and photographs built on the fly.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use truckdoc::docx::{Document, ParagraphPath};
use truckdoc::models::{ExtractedFields, MergedRecord, TruckType};
use truckdoc::render::{
    RenderError, RenderIssue, ReportFields, ReportForm, ReportGenerator, ReportRequest,
};
use truckdoc::services::merge_fields;

/// Write a solid-colour PNG of the given size.
fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let mut bytes = Cursor::new(Vec::new());
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 0]))
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes.into_inner()).unwrap();
    path
}

fn fields() -> ReportFields {
    ReportFields {
        plate: "KEL-0283".to_string(),
        address: "中山路12號".to_string(),
        date: "113年5月2日".to_string(),
        code: Some("112".to_string()),
    }
}

/// A template with text tokens in the body, a split token, and both image
/// tokens inside a table.
const YELLOW_BODY: &str = r#"
<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>地點：{{ADDRESS}}</w:t></w:r></w:p>
<w:p><w:r><w:t>日期：</w:t></w:r><w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>{{DATE}}</w:t></w:r></w:p>
<w:p><w:r><w:t>{{LICENSE_</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>PLATE}}</w:t></w:r></w:p>
<w:tbl>
  <w:tr><w:tc><w:p><w:r><w:t>{{IMAGE_1}}</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>{{IMAGE_2}}</w:t></w:r></w:p></w:tc></w:tr>
  <w:tr><w:tc><w:p><w:r><w:t>車牌 {{LICENSE_PLATE}}</w:t></w:r></w:p></w:tc></w:tr>
</w:tbl>
"#;

fn setup() -> (TempDir, ReportGenerator) {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();

    Document::from_body_xml(YELLOW_BODY)
        .unwrap()
        .save(&templates.join(TruckType::Compression.template_filename()))
        .unwrap();
    Document::blank(&["{{ADDRESS}}", "{{DATE}}", "{{LICENSE_PLATE}}", "{{IMAGE_1}}", "{{IMAGE_2}}"])
        .save(&templates.join(TruckType::Recycling.template_filename()))
        .unwrap();

    let generator = ReportGenerator::new(&templates, dir.path().join("output"));
    (dir, generator)
}

fn has_drawing(doc: &Document, path: ParagraphPath) -> bool {
    doc.paragraph(path)
        .unwrap()
        .any_descendant(&|e| e.name == "w:drawing")
}

#[test]
fn test_full_report_for_compression_truck() {
    let (dir, generator) = setup();
    let image1 = write_png(dir.path(), "front.png", 64, 48);
    let image2 = write_png(dir.path(), "side.png", 32, 32);

    let outcome = generator
        .generate(&ReportRequest {
            fields: fields(),
            truck_type: "壓縮式垃圾車".to_string(),
            image1: Some(image1),
            image2: Some(image2),
        })
        .unwrap();

    assert_eq!(
        outcome.path.file_name().unwrap().to_str().unwrap(),
        "空白-1.2級檢查-112-垃圾車.docx"
    );
    // The split {{LICENSE_PLATE}} in the body is left as-is, but the table
    // copy is replaced, so no warning is raised.
    assert!(outcome.issues.is_empty(), "{:?}", outcome.issues);

    let doc = Document::open(&outcome.path).unwrap();
    assert_eq!(
        doc.paragraph_texts(),
        vec![
            "地點：中山路12號",
            "日期：113年5月2日",
            "{{LICENSE_PLATE}}",
            "",
            "",
            "車牌 KEL-0283",
        ]
    );

    let image_cells = [0, 1].map(|cell| ParagraphPath::Cell {
        table: 0,
        row: 0,
        cell,
        paragraph: 0,
    });
    for path in image_cells {
        assert!(has_drawing(&doc, path));
    }
    assert!(doc.part("word/media/image1.png").is_some());
    assert!(doc.part("word/media/image2.png").is_some());

    // Run properties around the replaced date survive.
    let date_paragraph = doc.paragraph(ParagraphPath::Body(1)).unwrap();
    assert!(date_paragraph.any_descendant(&|e| e.name == "w:u"));
}

#[test]
fn test_missing_photo_still_saves_report() {
    let (dir, generator) = setup();
    let image1 = write_png(dir.path(), "front.png", 40, 30);

    let outcome = generator
        .generate(&ReportRequest {
            fields: ReportFields {
                code: None,
                ..fields()
            },
            truck_type: "recycling".to_string(),
            image1: Some(image1),
            image2: Some(dir.path().join("missing.jpg")),
        })
        .unwrap();

    assert!(outcome.path.ends_with("空白-1.2級檢查-XXX-回收車.docx"));
    assert!(matches!(
        &outcome.issues[..],
        [RenderIssue::ImageFailed { token, .. }] if token == "{{IMAGE_2}}"
    ));

    let doc = Document::open(&outcome.path).unwrap();
    assert_eq!(
        doc.paragraph_texts(),
        vec!["中山路12號", "113年5月2日", "KEL-0283", "", "{{IMAGE_2}}"]
    );
    assert!(has_drawing(&doc, ParagraphPath::Body(3)));
}

#[test]
fn test_invalid_selection_produces_no_file() {
    let (dir, generator) = setup();

    let err = generator
        .generate(&ReportRequest {
            fields: fields(),
            truck_type: "油罐車".to_string(),
            image1: None,
            image2: None,
        })
        .unwrap_err();

    assert!(matches!(err, RenderError::InvalidSelection(_)));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_ocr_prefill_to_report() {
    let (_dir, generator) = setup();

    let first = ExtractedFields {
        plate: Some("KEL-0283".to_string()),
        date: Some("113年5月2日".to_string()),
        ..Default::default()
    };
    let second = ExtractedFields {
        address: Some("中山路12號".to_string()),
        code: Some("112".to_string()),
        ..Default::default()
    };
    let merged: MergedRecord = merge_fields(Some(&first), Some(&second));

    let mut form = ReportForm::prefill(&merged);
    assert_eq!(form.plate_entry, "KEL-0283(112)");
    form.apply_overrides(None, None, Some("113年5月3日".to_string()));

    let outcome = generator
        .generate(&ReportRequest {
            fields: form.resolve().unwrap(),
            truck_type: "white".to_string(),
            image1: None,
            image2: None,
        })
        .unwrap();

    assert!(outcome.path.ends_with("空白-1.2級檢查-112-回收車.docx"));
    let doc = Document::open(&outcome.path).unwrap();
    assert_eq!(doc.paragraph_texts()[1], "113年5月3日");
}
