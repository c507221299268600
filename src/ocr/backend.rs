//! OCR backend abstraction.
//!
//! Supports:
//! - Tesseract: Traditional OCR via command-line (CPU)
//! - PaddleOCR: CNN-based OCR via ONNX Runtime (feature: ocr-paddle)

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Unknown OCR backend: {0}")]
    UnknownBackend(String),

    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One recognized line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    /// Recognition confidence (0.0 - 1.0), if the backend reports one.
    pub confidence: Option<f32>,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized lines in top-to-bottom reading order.
    pub lines: Vec<RecognizedLine>,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrResult {
    /// All line texts joined with newlines, in order.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    Tesseract,
    /// PaddleOCR via ONNX Runtime.
    PaddleOcr,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::PaddleOcr => "paddleocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "paddleocr" | "paddle" => Some(OcrBackendType::PaddleOcr),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
///
/// A backend is constructed once at startup and shared read-only by every
/// scan; implementations that cache an engine must do so internally.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (dependencies installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Configuration for OCR backends.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Language for OCR (e.g., "chi_tra+eng").
    pub language: String,
    /// Path to model files (for backends that need them).
    pub model_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "chi_tra+eng".to_string(),
            model_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_round_trip_names() {
        assert_eq!(OcrBackendType::from_str("Tesseract"), Some(OcrBackendType::Tesseract));
        assert_eq!(OcrBackendType::from_str("paddle"), Some(OcrBackendType::PaddleOcr));
        assert_eq!(OcrBackendType::from_str("easyocr"), None);
        assert_eq!(OcrBackendType::PaddleOcr.to_string(), "paddleocr");
    }

    #[test]
    fn test_text_joins_lines_in_order() {
        let result = OcrResult {
            lines: vec![
                RecognizedLine::new("113年5月2日"),
                RecognizedLine {
                    text: "KEL-0283".to_string(),
                    confidence: Some(0.93),
                },
            ],
            backend: OcrBackendType::Tesseract,
            processing_time_ms: 12,
        };
        assert_eq!(result.text(), "113年5月2日\nKEL-0283");
    }
}
