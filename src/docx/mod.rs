//! Word document packages.
//!
//! A `.docx` file is a zip archive of XML parts. Only three parts are parsed:
//! the main document, its relationships and the content-type table. Every
//! other part is carried through as raw bytes, in its original order.

mod drawing;
mod package;
pub mod text;
pub mod xml;

use thiserror::Error;

pub use drawing::{ImageData, EMU_PER_INCH};
pub use package::{Document, ParagraphPath, ParagraphScan, SkippedRow};

/// Errors that can occur while reading, editing or writing a document.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(std::path::PathBuf),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
}
