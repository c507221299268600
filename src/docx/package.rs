//! The zip package and the paragraph layout of the main document.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::drawing::{inline_picture_run, ImageData};
use super::text::{new_paragraph, paragraph_text, PARAGRAPH};
use super::xml::{Element, Node};
use super::DocxError;

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const OFFICE_DOCUMENT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

const BODY: &str = "w:body";
const TABLE: &str = "w:tbl";
const ROW: &str = "w:tr";
const CELL: &str = "w:tc";
const ROW_ALLOWED: [&str; 3] = ["w:trPr", "w:tblPrEx", CELL];

/// Where a paragraph lives. Indices count only elements of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphPath {
    Body(usize),
    Cell {
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    },
}

/// A table row left out of the layout because its structure is unexpected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub table: usize,
    pub row: usize,
    pub reason: String,
}

/// Every reachable paragraph in search order: body paragraphs first, then
/// table cell paragraphs table by table, row by row.
#[derive(Debug, Clone, Default)]
pub struct ParagraphScan {
    pub paragraphs: Vec<ParagraphPath>,
    pub skipped_rows: Vec<SkippedRow>,
}

/// An opened document package.
#[derive(Debug, Clone)]
pub struct Document {
    /// Raw parts in archive order. The three parsed parts are re-serialized
    /// in place of their stored bytes on write.
    parts: Vec<(String, Vec<u8>)>,
    root: Element,
    relationships: Element,
    content_types: Element,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push((file.name().to_string(), data));
        }

        let parse_part = |name: &str| -> Result<Option<Element>, DocxError> {
            parts
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, data)| Element::parse(&String::from_utf8_lossy(data)))
                .transpose()
        };

        let root = parse_part(DOCUMENT_PART)?
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
        let content_types = parse_part(CONTENT_TYPES_PART)?
            .ok_or_else(|| DocxError::MissingPart(CONTENT_TYPES_PART.to_string()))?;
        let relationships = match parse_part(DOCUMENT_RELS_PART)? {
            Some(rels) => rels,
            None => {
                parts.push((DOCUMENT_RELS_PART.to_string(), Vec::new()));
                Element::new("Relationships").with_attr("xmlns", RELS_NS)
            }
        };

        if root.find_child(BODY).is_none() {
            return Err(DocxError::Malformed("document has no body".to_string()));
        }

        Ok(Self {
            parts,
            root,
            relationships,
            content_types,
        })
    }

    /// A minimal package whose body holds one plain paragraph per line.
    pub fn blank<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut body = Element::new(BODY);
        for line in lines {
            body.children
                .push(Node::Element(new_paragraph(line.as_ref())));
        }
        Self::with_body(body)
    }

    /// A minimal package around the given `w:body` inner XML, which may use
    /// the `w:`, `r:` and `wp:` prefixes.
    pub fn from_body_xml(body_xml: &str) -> Result<Self, DocxError> {
        let wrapped = format!(
            r#"<w:body xmlns:w="{}" xmlns:r="{}" xmlns:wp="{}">{}</w:body>"#,
            W_NS, R_NS, WP_NS, body_xml
        );
        let mut body = Element::parse(&wrapped)?;
        body.attrs.clear();
        Ok(Self::with_body(body))
    }

    fn with_body(body: Element) -> Self {
        let root = Element::new("w:document")
            .with_attr("xmlns:w", W_NS)
            .with_attr("xmlns:r", R_NS)
            .with_attr("xmlns:wp", WP_NS)
            .with_child(body);

        let content_types = Element::new("Types")
            .with_attr("xmlns", CONTENT_TYPES_NS)
            .with_child(
                Element::new("Default")
                    .with_attr("Extension", "rels")
                    .with_attr("ContentType", RELS_CONTENT_TYPE),
            )
            .with_child(
                Element::new("Default")
                    .with_attr("Extension", "xml")
                    .with_attr("ContentType", "application/xml"),
            )
            .with_child(
                Element::new("Override")
                    .with_attr("PartName", format!("/{}", DOCUMENT_PART))
                    .with_attr("ContentType", DOCUMENT_CONTENT_TYPE),
            );

        let package_rels = Element::new("Relationships")
            .with_attr("xmlns", RELS_NS)
            .with_child(
                Element::new("Relationship")
                    .with_attr("Id", "rId1")
                    .with_attr("Type", OFFICE_DOCUMENT_REL_TYPE)
                    .with_attr("Target", DOCUMENT_PART),
            );

        let parts = vec![
            (CONTENT_TYPES_PART.to_string(), Vec::new()),
            (
                PACKAGE_RELS_PART.to_string(),
                package_rels.to_document_string().into_bytes(),
            ),
            (DOCUMENT_PART.to_string(), Vec::new()),
            (DOCUMENT_RELS_PART.to_string(), Vec::new()),
        ];

        Self {
            parts,
            root,
            relationships: Element::new("Relationships").with_attr("xmlns", RELS_NS),
            content_types,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            match name.as_str() {
                DOCUMENT_PART => writer.write_all(self.root.to_document_string().as_bytes())?,
                DOCUMENT_RELS_PART => {
                    writer.write_all(self.relationships.to_document_string().as_bytes())?
                }
                CONTENT_TYPES_PART => {
                    writer.write_all(self.content_types.to_document_string().as_bytes())?
                }
                _ => writer.write_all(data)?,
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to `path` through a temporary file in the same
    /// directory, so a failed save never leaves a truncated document.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Raw bytes of a part that is carried through unparsed.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn relationship_target(&self, id: &str) -> Option<&str> {
        self.relationships
            .child_elements("Relationship")
            .find(|r| r.attr("Id") == Some(id))
            .and_then(|r| r.attr("Target"))
    }

    fn body(&self) -> Option<&Element> {
        self.root.find_child(BODY)
    }

    fn body_mut(&mut self) -> Option<&mut Element> {
        self.root.find_child_mut(BODY)
    }

    /// Lay out every paragraph the renderer searches, in search order.
    pub fn scan_paragraphs(&self) -> ParagraphScan {
        let mut scan = ParagraphScan::default();
        let Some(body) = self.body() else {
            return scan;
        };

        scan.paragraphs.extend(
            (0..body.child_elements(PARAGRAPH).count()).map(ParagraphPath::Body),
        );

        for (table_idx, table) in body.child_elements(TABLE).enumerate() {
            for (row_idx, row) in table.child_elements(ROW).enumerate() {
                if let Err(reason) = check_row_structure(row) {
                    scan.skipped_rows.push(SkippedRow {
                        table: table_idx,
                        row: row_idx,
                        reason,
                    });
                    continue;
                }
                for (cell_idx, cell) in row.child_elements(CELL).enumerate() {
                    let count = cell.child_elements(PARAGRAPH).count();
                    scan.paragraphs
                        .extend((0..count).map(|paragraph| ParagraphPath::Cell {
                            table: table_idx,
                            row: row_idx,
                            cell: cell_idx,
                            paragraph,
                        }));
                }
            }
        }
        scan
    }

    pub fn paragraph(&self, path: ParagraphPath) -> Option<&Element> {
        let body = self.body()?;
        match path {
            ParagraphPath::Body(i) => body.child_elements(PARAGRAPH).nth(i),
            ParagraphPath::Cell {
                table,
                row,
                cell,
                paragraph,
            } => body
                .child_elements(TABLE)
                .nth(table)?
                .child_elements(ROW)
                .nth(row)?
                .child_elements(CELL)
                .nth(cell)?
                .child_elements(PARAGRAPH)
                .nth(paragraph),
        }
    }

    pub fn paragraph_mut(&mut self, path: ParagraphPath) -> Option<&mut Element> {
        let body = self.body_mut()?;
        match path {
            ParagraphPath::Body(i) => body.child_elements_mut(PARAGRAPH).nth(i),
            ParagraphPath::Cell {
                table,
                row,
                cell,
                paragraph,
            } => body
                .child_elements_mut(TABLE)
                .nth(table)?
                .child_elements_mut(ROW)
                .nth(row)?
                .child_elements_mut(CELL)
                .nth(cell)?
                .child_elements_mut(PARAGRAPH)
                .nth(paragraph),
        }
    }

    /// Visible text of every scanned paragraph, in search order.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.scan_paragraphs()
            .paragraphs
            .into_iter()
            .filter_map(|path| self.paragraph(path))
            .map(paragraph_text)
            .collect()
    }

    /// Store the picture as a new media part and append a run displaying it
    /// `width_inches` wide to the paragraph at `path`.
    ///
    /// Returns `None` without touching the package when `path` does not
    /// resolve.
    pub fn embed_image(
        &mut self,
        path: ParagraphPath,
        image: &ImageData,
        width_inches: f64,
    ) -> Option<&mut Element> {
        self.paragraph(path)?;

        let media_index = (1..)
            .find(|n| {
                let prefix = format!("word/media/image{}.", n);
                !self.parts.iter().any(|(name, _)| name.starts_with(&prefix))
            })
            .unwrap_or(1);
        let file_name = format!("image{}.{}", media_index, image.extension);
        self.parts
            .push((format!("word/media/{}", file_name), image.bytes.clone()));

        let rel_id = self.next_relationship_id();
        self.relationships.children.push(Node::Element(
            Element::new("Relationship")
                .with_attr("Id", rel_id.as_str())
                .with_attr("Type", IMAGE_REL_TYPE)
                .with_attr("Target", format!("media/{}", file_name)),
        ));

        self.ensure_default_content_type(image.extension, image.mime_type);
        self.ensure_root_namespace("xmlns:wp", WP_NS);
        self.ensure_root_namespace("xmlns:r", R_NS);

        let doc_pr_id = max_doc_pr_id(&self.root) + 1;
        let run = inline_picture_run(&rel_id, doc_pr_id, &file_name, image.extent_emu(width_inches));

        // Registration only touches the package parts and root attributes,
        // so the paragraph still resolves.
        let paragraph = self.paragraph_mut(path)?;
        paragraph.children.push(Node::Element(run));
        Some(paragraph)
    }

    fn next_relationship_id(&self) -> String {
        let max = self
            .relationships
            .child_elements("Relationship")
            .filter_map(|r| r.attr("Id"))
            .filter_map(|id| id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    fn ensure_default_content_type(&mut self, extension: &str, content_type: &str) {
        let present = self.content_types.child_elements("Default").any(|d| {
            d.attr("Extension")
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        });
        if !present {
            self.content_types.children.push(Node::Element(
                Element::new("Default")
                    .with_attr("Extension", extension)
                    .with_attr("ContentType", content_type),
            ));
        }
    }

    fn ensure_root_namespace(&mut self, prefix_attr: &str, uri: &str) {
        if self.root.attr(prefix_attr).is_none() {
            self.root.set_attr(prefix_attr, uri);
        }
    }
}

/// A row exposes the expected cell sequence when it has at least one cell
/// and nothing but row properties and cells as element children.
fn check_row_structure(row: &Element) -> Result<(), String> {
    if let Some(unexpected) = row.elements().find(|e| !ROW_ALLOWED.contains(&e.name.as_str())) {
        return Err(format!("unexpected <{}> in row", unexpected.name));
    }
    if row.find_child(CELL).is_none() {
        return Err("row has no cells".to_string());
    }
    Ok(())
}

fn max_doc_pr_id(element: &Element) -> u32 {
    let own = if element.name == "wp:docPr" {
        element.attr("id").and_then(|id| id.parse().ok()).unwrap_or(0)
    } else {
        0
    };
    element.elements().map(max_doc_pr_id).fold(own, u32::max)
}
