//! OCR collaborator.
//!
//! Turns a photograph into recognized text lines. The rest of the crate only
//! consumes the ordered line text; confidence scores are carried along for
//! display but never drive extraction.
//!
//! ## OCR Backends
//!
//! - **Tesseract**: Traditional OCR, widely available, CPU-based (default)
//! - **PaddleOCR**: CNN-based, strong on CJK text, via ONNX (feature: ocr-paddle)

mod backend;
mod model_utils;
mod tesseract;

#[cfg(feature = "ocr-paddle")]
mod paddle_backend;

pub use backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult, RecognizedLine};
pub use tesseract::TesseractBackend;

#[cfg(feature = "ocr-paddle")]
pub use paddle_backend::PaddleBackend;

/// Build the process-wide OCR backend by name.
pub fn create_backend(name: &str, config: OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    let backend_type =
        OcrBackendType::from_str(name).ok_or_else(|| OcrError::UnknownBackend(name.to_string()))?;

    match backend_type {
        OcrBackendType::Tesseract => Ok(Box::new(TesseractBackend::with_config(config))),
        #[cfg(feature = "ocr-paddle")]
        OcrBackendType::PaddleOcr => Ok(Box::new(PaddleBackend::with_config(config))),
        #[cfg(not(feature = "ocr-paddle"))]
        OcrBackendType::PaddleOcr => Err(OcrError::BackendNotAvailable(
            "PaddleOCR not compiled (enable ocr-paddle feature)".to_string(),
        )),
    }
}
