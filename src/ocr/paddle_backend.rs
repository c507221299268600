//! PaddleOCR backend implementation.
//!
//! Uses paddle-ocr-rs for OCR via ONNX Runtime. The PP-OCRv4 Chinese models
//! read both the CJK address/date text and the Latin plate characters.
//!
//! Models are automatically downloaded on first use from:
//! https://github.com/RapidAI/RapidOCR

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use paddle_ocr_rs::ocr_lite::OcrLite;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult, RecognizedLine};
use super::model_utils::{ModelSpec, ModelStore};

/// Global cached OcrLite instance (initialized once, reused for all OCR calls).
/// Wrapped in Mutex since detect_from_path needs &mut self.
static OCR_ENGINE: OnceLock<Mutex<OcrLite>> = OnceLock::new();

const DET_MODEL_NAME: &str = "ch_PP-OCRv4_det_infer.onnx";
const REC_MODEL_NAME: &str = "ch_PP-OCRv4_rec_infer.onnx";
const CLS_MODEL_NAME: &str = "ch_ppocr_mobile_v2.0_cls_infer.onnx";

const MODELS: ModelStore = ModelStore {
    name: "paddle-ocr",
    models: &[
        ModelSpec {
            url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_det_infer.onnx",
            filename: DET_MODEL_NAME,
        },
        ModelSpec {
            url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_rec_infer.onnx",
            filename: REC_MODEL_NAME,
        },
        ModelSpec {
            url: "https://www.modelscope.cn/models/RapidAI/RapidOCR/resolve/v3.4.0/onnx/PP-OCRv4/cls/ch_ppocr_mobile_v2.0_cls_infer.onnx",
            filename: CLS_MODEL_NAME,
        },
    ],
};

/// PaddleOCR backend via ONNX Runtime.
pub struct PaddleBackend {
    config: OcrConfig,
}

impl PaddleBackend {
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    fn find_model_dir(&self) -> Option<PathBuf> {
        MODELS.locate(self.config.model_path.as_deref())
    }

    fn ensure_models(&self) -> Result<PathBuf, OcrError> {
        match self.find_model_dir() {
            Some(dir) => Ok(dir),
            None => MODELS.fetch(),
        }
    }

    /// Get or initialize the cached OCR engine.
    fn get_or_init_engine(&self) -> Result<&'static Mutex<OcrLite>, OcrError> {
        if let Some(engine) = OCR_ENGINE.get() {
            return Ok(engine);
        }

        let model_dir = self.ensure_models()?;
        let path_str = |name: &str| model_dir.join(name).to_string_lossy().to_string();

        let mut ocr = OcrLite::new();
        ocr.init_models(
            &path_str(DET_MODEL_NAME),
            &path_str(CLS_MODEL_NAME),
            &path_str(REC_MODEL_NAME),
            4,
        )
        .map_err(|e| OcrError::OcrFailed(format!("Failed to init PaddleOCR: {}", e)))?;

        // Another thread may have won the race; either engine is fine.
        let _ = OCR_ENGINE.set(Mutex::new(ocr));

        OCR_ENGINE
            .get()
            .ok_or_else(|| OcrError::OcrFailed("Failed to cache OCR engine".to_string()))
    }

    fn run_paddle(&self, image_path: &Path) -> Result<Vec<RecognizedLine>, OcrError> {
        let engine_mutex = self.get_or_init_engine()?;
        let mut ocr = engine_mutex
            .lock()
            .map_err(|e| OcrError::OcrFailed(format!("Failed to lock OCR engine: {}", e)))?;

        let path = image_path
            .to_str()
            .ok_or_else(|| OcrError::OcrFailed("Image path is not valid UTF-8".to_string()))?;

        let result = ocr
            .detect_from_path(
                path,
                50,    // padding
                1024,  // max side length
                0.5,   // box score threshold
                0.3,   // box threshold
                1.6,   // unclip ratio
                true,  // do angle
                false, // most angle
            )
            .map_err(|e| OcrError::OcrFailed(format!("PaddleOCR detection failed: {}", e)))?;

        Ok(result
            .text_blocks
            .iter()
            .map(|block| RecognizedLine {
                text: block.text.clone(),
                confidence: Some(block.text_score),
            })
            .collect())
    }
}

impl Default for PaddleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for PaddleBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::PaddleOcr
    }

    fn is_available(&self) -> bool {
        // Models are auto-downloaded on first use
        true
    }

    fn availability_hint(&self) -> String {
        match self.find_model_dir() {
            Some(path) => format!("PaddleOCR models found at {}", path.display()),
            None => format!(
                "PaddleOCR models will be auto-downloaded on first use (~15 MB total) to {}",
                MODELS.default_dir().display()
            ),
        }
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        if !image_path.exists() {
            return Err(OcrError::ImageNotFound(image_path.to_path_buf()));
        }

        let start = Instant::now();
        let lines = self.run_paddle(image_path)?;
        let elapsed = start.elapsed();

        Ok(OcrResult {
            lines,
            backend: OcrBackendType::PaddleOcr,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}
