//! Placeholder substitution inside a document.
//!
//! Text tokens are matched one run at a time. A token whose characters are
//! spread over several runs (a formatting change in the middle of it) is not
//! seen and stays in the output as literal text. Image tokens are matched on
//! the whole paragraph text, and only the first paragraph carrying the token
//! receives the picture.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::docx::text::{paragraph_text, run_text, runs_mut, set_paragraph_text, set_run_text};
use crate::docx::xml::Element;
use crate::docx::{Document, ImageData, ParagraphPath};

use super::placeholders::PlaceholderMap;

/// A picture to place at the first occurrence of `token`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlaceholder {
    pub token: String,
    pub path: PathBuf,
    pub width_inches: f64,
}

/// Something that went wrong without stopping the render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderIssue {
    PlaceholderNotFound {
        token: String,
    },
    ImageFailed {
        token: String,
        path: PathBuf,
        reason: String,
    },
    RowSkipped {
        table: usize,
        row: usize,
        reason: String,
    },
}

impl fmt::Display for RenderIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderIssue::PlaceholderNotFound { token } => {
                write!(f, "placeholder '{}' not found in the document", token)
            }
            RenderIssue::ImageFailed {
                token,
                path,
                reason,
            } => write!(
                f,
                "could not insert image {} for '{}': {}",
                path.display(),
                token,
                reason
            ),
            RenderIssue::RowSkipped { table, row, reason } => {
                write!(f, "skipped row {} of table {}: {}", row + 1, table + 1, reason)
            }
        }
    }
}

/// Apply text replacements, then images, collecting every non-fatal issue.
pub fn render(
    doc: &mut Document,
    text: &PlaceholderMap,
    images: &[ImagePlaceholder],
) -> Vec<RenderIssue> {
    let mut issues = substitute_text(doc, text);
    for image in images {
        if let Some(issue) = substitute_image(doc, image) {
            issues.push(issue);
        }
    }
    issues
}

/// Replace each token wherever a single run contains it whole.
pub fn substitute_text(doc: &mut Document, map: &PlaceholderMap) -> Vec<RenderIssue> {
    let scan = doc.scan_paragraphs();
    let mut issues: Vec<RenderIssue> = scan
        .skipped_rows
        .into_iter()
        .map(|skipped| {
            tracing::warn!(
                "Skipping row {} of table {}: {}",
                skipped.row + 1,
                skipped.table + 1,
                skipped.reason
            );
            RenderIssue::RowSkipped {
                table: skipped.table,
                row: skipped.row,
                reason: skipped.reason,
            }
        })
        .collect();

    let mut hits = vec![0usize; map.len()];
    for path in scan.paragraphs {
        let Some(paragraph) = doc.paragraph_mut(path) else {
            continue;
        };
        for (i, (token, value)) in map.iter().enumerate() {
            hits[i] += replace_in_runs(paragraph, token, value);
        }
    }

    for ((token, _), count) in map.iter().zip(hits) {
        if count == 0 {
            tracing::warn!("Placeholder '{}' not found in the document", token);
            issues.push(RenderIssue::PlaceholderNotFound {
                token: token.to_string(),
            });
        } else {
            tracing::debug!("Replaced '{}' in {} run(s)", token, count);
        }
    }
    issues
}

/// Insert a picture at the first paragraph containing the token.
///
/// The picture is read and validated before the document is touched, so a
/// bad file leaves the token where it was.
pub fn substitute_image(doc: &mut Document, placeholder: &ImagePlaceholder) -> Option<RenderIssue> {
    let token = placeholder.token.as_str();

    let image = match ImageData::load(&placeholder.path) {
        Ok(image) => image,
        Err(e) => {
            tracing::error!(
                "Cannot insert image {} for '{}': {}",
                placeholder.path.display(),
                token,
                e
            );
            return Some(RenderIssue::ImageFailed {
                token: token.to_string(),
                path: placeholder.path.clone(),
                reason: e.to_string(),
            });
        }
    };

    let Some(path) = find_first(doc, token) else {
        tracing::warn!("Image placeholder '{}' not found in the document", token);
        return Some(RenderIssue::PlaceholderNotFound {
            token: token.to_string(),
        });
    };

    let Some(paragraph) = doc.paragraph_mut(path) else {
        return Some(RenderIssue::PlaceholderNotFound {
            token: token.to_string(),
        });
    };
    clear_token(paragraph, token);
    if doc
        .embed_image(path, &image, placeholder.width_inches)
        .is_none()
    {
        return Some(RenderIssue::PlaceholderNotFound {
            token: token.to_string(),
        });
    }
    tracing::debug!("Inserted {} at '{}'", placeholder.path.display(), token);
    None
}

fn find_first(doc: &Document, token: &str) -> Option<ParagraphPath> {
    doc.scan_paragraphs().paragraphs.into_iter().find(|&path| {
        doc.paragraph(path)
            .is_some_and(|p| paragraph_text(p).contains(token))
    })
}

fn replace_in_runs(paragraph: &mut Element, token: &str, value: &str) -> usize {
    let mut count = 0;
    for run in runs_mut(paragraph) {
        let text = run_text(run);
        if text.contains(token) {
            set_run_text(run, &text.replace(token, value));
            count += 1;
        }
    }
    count
}

/// Remove the token from a paragraph. When it spans runs, the paragraph is
/// collapsed into its first run.
fn clear_token(paragraph: &mut Element, token: &str) {
    replace_in_runs(paragraph, token, "");
    let text = paragraph_text(paragraph);
    if text.contains(token) {
        set_paragraph_text(paragraph, &text.replace(token, ""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::placeholders::{DATE, IMAGE_1, LICENSE_PLATE};
    use std::io::Cursor;

    fn write_png(dir: &std::path::Path, name: &str) -> PathBuf {
        let mut bytes = Cursor::new(Vec::new());
        image::RgbImage::new(8, 4)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes.into_inner()).unwrap();
        path
    }

    fn date_map() -> PlaceholderMap {
        let mut map = PlaceholderMap::new();
        map.insert(DATE, "113年5月2日");
        map
    }

    fn has_drawing(doc: &Document, path: ParagraphPath) -> bool {
        doc.paragraph(path)
            .unwrap()
            .any_descendant(&|e| e.name == "w:drawing")
    }

    #[test]
    fn test_single_run_token_keeps_styling() {
        let mut doc = Document::from_body_xml(
            r#"<w:p><w:r><w:rPr><w:b/><w:color w:val="FF0000"/></w:rPr><w:t>{{DATE}}</w:t></w:r></w:p>"#,
        )
        .unwrap();

        let issues = substitute_text(&mut doc, &date_map());
        assert!(issues.is_empty());
        assert_eq!(doc.paragraph_texts(), vec!["113年5月2日"]);

        let run = doc.paragraph(ParagraphPath::Body(0)).unwrap().find_child("w:r").unwrap();
        let props = run.find_child("w:rPr").unwrap();
        assert!(props.find_child("w:b").is_some());
        assert_eq!(props.find_child("w:color").unwrap().attr("w:val"), Some("FF0000"));
    }

    #[test]
    fn test_token_split_across_runs_is_left_alone() {
        let mut doc = Document::from_body_xml(
            r#"<w:p><w:r><w:t>{{DA</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>TE}}</w:t></w:r></w:p>"#,
        )
        .unwrap();

        let issues = substitute_text(&mut doc, &date_map());
        assert_eq!(doc.paragraph_texts(), vec!["{{DATE}}"]);
        assert_eq!(
            issues,
            vec![RenderIssue::PlaceholderNotFound {
                token: DATE.to_string()
            }]
        );
    }

    #[test]
    fn test_replacement_inside_surrounding_text_and_tables() {
        let mut doc = Document::from_body_xml(
            r#"<w:p><w:r><w:t>日期：{{DATE}} 止</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{DATE}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        )
        .unwrap();

        substitute_text(&mut doc, &date_map());
        assert_eq!(doc.paragraph_texts(), vec!["日期：113年5月2日 止", "113年5月2日"]);
    }

    #[test]
    fn test_malformed_row_is_reported_and_skipped() {
        let mut doc = Document::from_body_xml(
            r#"<w:tbl><w:tr><w:customXml/><w:tc><w:p><w:r><w:t>{{DATE}}</w:t></w:r></w:p></w:tc></w:tr>
               <w:tr><w:tc><w:p><w:r><w:t>{{DATE}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        )
        .unwrap();

        let issues = substitute_text(&mut doc, &date_map());
        assert!(matches!(&issues[..], [RenderIssue::RowSkipped { row: 0, .. }]));
        assert_eq!(doc.paragraph_texts(), vec!["113年5月2日"]);
    }

    #[test]
    fn test_only_first_image_occurrence_is_replaced() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = write_png(dir.path(), "a.png");
        let mut doc = Document::from_body_xml(
            r#"<w:p><w:r><w:t>{{IMAGE_1}}</w:t></w:r></w:p><w:p><w:r><w:t>{{IMAGE_1}}</w:t></w:r></w:p>"#,
        )
        .unwrap();

        let issue = substitute_image(
            &mut doc,
            &ImagePlaceholder {
                token: IMAGE_1.to_string(),
                path: png,
                width_inches: 5.0,
            },
        );
        assert_eq!(issue, None);
        assert_eq!(doc.paragraph_texts(), vec!["", IMAGE_1]);
        assert!(has_drawing(&doc, ParagraphPath::Body(0)));
        assert!(!has_drawing(&doc, ParagraphPath::Body(1)));
    }

    #[test]
    fn test_image_in_table_cell_when_body_lacks_token() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = write_png(dir.path(), "a.png");
        let mut doc = Document::from_body_xml(
            r#"<w:p><w:r><w:t>no token</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>照片 {{IMA</w:t></w:r><w:r><w:t>GE_1}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        )
        .unwrap();

        let issue = substitute_image(
            &mut doc,
            &ImagePlaceholder {
                token: IMAGE_1.to_string(),
                path: png,
                width_inches: 5.0,
            },
        );
        assert_eq!(issue, None);
        let cell = ParagraphPath::Cell {
            table: 0,
            row: 0,
            cell: 0,
            paragraph: 0,
        };
        assert_eq!(paragraph_text(doc.paragraph(cell).unwrap()), "照片 ");
        assert!(has_drawing(&doc, cell));
    }

    #[test]
    fn test_missing_image_is_reported_and_render_continues() {
        let mut doc = Document::from_body_xml(
            r#"<w:p><w:r><w:t>{{LICENSE_PLATE}}</w:t></w:r></w:p><w:p><w:r><w:t>{{IMAGE_1}}</w:t></w:r></w:p>"#,
        )
        .unwrap();
        let mut map = PlaceholderMap::new();
        map.insert(LICENSE_PLATE, "KEL-0283");

        let issues = render(
            &mut doc,
            &map,
            &[ImagePlaceholder {
                token: IMAGE_1.to_string(),
                path: PathBuf::from("/nonexistent/photo.png"),
                width_inches: 5.0,
            }],
        );

        assert!(matches!(&issues[..], [RenderIssue::ImageFailed { token, .. }] if token == IMAGE_1));
        assert_eq!(doc.paragraph_texts(), vec!["KEL-0283", IMAGE_1]);
    }

    #[test]
    fn test_absent_image_token_is_a_warning() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = write_png(dir.path(), "a.png");
        let mut doc = Document::blank(&["nothing here"]);

        let issue = substitute_image(
            &mut doc,
            &ImagePlaceholder {
                token: IMAGE_1.to_string(),
                path: png,
                width_inches: 5.0,
            },
        );
        assert_eq!(
            issue,
            Some(RenderIssue::PlaceholderNotFound {
                token: IMAGE_1.to_string()
            })
        );
        assert!(doc.part("word/media/image1.png").is_none());
    }
}
