//! Inline pictures.

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

use super::xml::Element;
use super::DocxError;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// A validated picture ready to embed.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageData {
    /// Read and validate a picture file.
    pub fn load(path: &Path) -> Result<Self, DocxError> {
        if !path.is_file() {
            return Err(DocxError::ImageNotFound(path.to_path_buf()));
        }
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocxError> {
        let kind = infer::get(&bytes)
            .ok_or_else(|| DocxError::UnsupportedImage("unrecognized file type".to_string()))?;

        let (extension, mime_type) = match kind.mime_type() {
            "image/png" => ("png", "image/png"),
            "image/jpeg" => ("jpeg", "image/jpeg"),
            "image/gif" => ("gif", "image/gif"),
            "image/bmp" => ("bmp", "image/bmp"),
            "image/tiff" => ("tiff", "image/tiff"),
            other => return Err(DocxError::UnsupportedImage(other.to_string())),
        };

        let (width_px, height_px) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| DocxError::UnsupportedImage(e.to_string()))?;
        if width_px == 0 || height_px == 0 {
            return Err(DocxError::UnsupportedImage("image has no pixels".to_string()));
        }

        Ok(Self {
            bytes,
            extension,
            mime_type,
            width_px,
            height_px,
        })
    }

    /// Extent in EMU for a given display width, height scaled to keep aspect.
    pub fn extent_emu(&self, width_inches: f64) -> (u64, u64) {
        let cx = (width_inches * EMU_PER_INCH).round() as u64;
        let cy = cx * u64::from(self.height_px) / u64::from(self.width_px);
        (cx, cy)
    }
}

/// Build a `w:r` holding an inline drawing that references `rel_id`.
pub(super) fn inline_picture_run(
    rel_id: &str,
    doc_pr_id: u32,
    file_name: &str,
    (cx, cy): (u64, u64),
) -> Element {
    let cx = cx.to_string();
    let cy = cy.to_string();

    let picture = Element::new("pic:pic")
        .with_attr("xmlns:pic", PIC_NS)
        .with_child(
            Element::new("pic:nvPicPr")
                .with_child(
                    Element::new("pic:cNvPr")
                        .with_attr("id", "0")
                        .with_attr("name", file_name),
                )
                .with_child(Element::new("pic:cNvPicPr")),
        )
        .with_child(
            Element::new("pic:blipFill")
                .with_child(Element::new("a:blip").with_attr("r:embed", rel_id))
                .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
        )
        .with_child(
            Element::new("pic:spPr")
                .with_child(
                    Element::new("a:xfrm")
                        .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                        .with_child(
                            Element::new("a:ext")
                                .with_attr("cx", cx.as_str())
                                .with_attr("cy", cy.as_str()),
                        ),
                )
                .with_child(
                    Element::new("a:prstGeom")
                        .with_attr("prst", "rect")
                        .with_child(Element::new("a:avLst")),
                ),
        );

    let inline = Element::new("wp:inline")
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(
            Element::new("wp:extent")
                .with_attr("cx", cx.as_str())
                .with_attr("cy", cy.as_str()),
        )
        .with_child(
            Element::new("wp:docPr")
                .with_attr("id", doc_pr_id.to_string())
                .with_attr("name", format!("Picture {}", doc_pr_id)),
        )
        .with_child(
            Element::new("wp:cNvGraphicFramePr").with_child(
                Element::new("a:graphicFrameLocks")
                    .with_attr("xmlns:a", A_NS)
                    .with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(
            Element::new("a:graphic").with_attr("xmlns:a", A_NS).with_child(
                Element::new("a:graphicData")
                    .with_attr("uri", PIC_NS)
                    .with_child(picture),
            ),
        );

    Element::new("w:r").with_child(Element::new("w:drawing").with_child(inline))
}
