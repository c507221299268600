//! Binary lookup and model storage shared by the OCR backends.

#[cfg(feature = "ocr-paddle")]
use std::path::{Path, PathBuf};
#[cfg(feature = "ocr-paddle")]
use std::process::Command;

#[cfg(feature = "ocr-paddle")]
use super::backend::OcrError;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// One downloadable model file.
#[cfg(feature = "ocr-paddle")]
pub struct ModelSpec {
    pub url: &'static str,
    pub filename: &'static str,
}

/// The set of model files a backend needs, stored under
/// `<data dir>/<name>/models` unless a directory is configured.
#[cfg(feature = "ocr-paddle")]
pub struct ModelStore {
    pub name: &'static str,
    pub models: &'static [ModelSpec],
}

#[cfg(feature = "ocr-paddle")]
impl ModelStore {
    pub fn default_dir(&self) -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(self.name)
            .join("models")
    }

    pub fn is_complete(&self, dir: &Path) -> bool {
        self.models
            .iter()
            .all(|model| dir.join(model.filename).is_file())
    }

    /// First directory holding every model, trying the configured one first.
    pub fn locate(&self, configured: Option<&Path>) -> Option<PathBuf> {
        configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::iter::once(self.default_dir()))
            .find(|dir| self.is_complete(dir))
    }

    /// Download whatever is missing from the default directory.
    pub fn fetch(&self) -> Result<PathBuf, OcrError> {
        let dir = self.default_dir();
        std::fs::create_dir_all(&dir)?;

        for model in self.models {
            let dest = dir.join(model.filename);
            if dest.is_file() {
                continue;
            }
            tracing::info!("Downloading {} model {}", self.name, model.filename);
            download(model.url, &dest)?;
        }

        if !self.is_complete(&dir) {
            return Err(OcrError::ModelNotFound(format!(
                "{} models missing from {}",
                self.name,
                dir.display()
            )));
        }
        Ok(dir)
    }
}

#[cfg(feature = "ocr-paddle")]
fn download(url: &str, dest: &Path) -> Result<(), OcrError> {
    let mut command = if check_binary("curl") {
        let mut c = Command::new("curl");
        c.args(["-fsSL", "-o"]);
        c
    } else if check_binary("wget") {
        let mut c = Command::new("wget");
        c.args(["-q", "-O"]);
        c
    } else {
        return Err(OcrError::BackendNotAvailable(
            "curl or wget is required to download OCR models".to_string(),
        ));
    };

    let status = command.arg(dest).arg(url).status()?;
    if status.success() {
        return Ok(());
    }
    let _ = std::fs::remove_file(dest);
    Err(OcrError::OcrFailed(format!("Failed to download {}", url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_binary_missing() {
        assert!(!check_binary("truckdoc-no-such-binary"));
    }

    #[cfg(feature = "ocr-paddle")]
    const STORE: ModelStore = ModelStore {
        name: "truckdoc-test-ocr",
        models: &[
            ModelSpec {
                url: "https://example.invalid/det.onnx",
                filename: "det.onnx",
            },
            ModelSpec {
                url: "https://example.invalid/rec.onnx",
                filename: "rec.onnx",
            },
        ],
    };

    #[cfg(feature = "ocr-paddle")]
    #[test]
    fn test_locate_prefers_complete_configured_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(STORE.locate(Some(dir.path())), None);

        std::fs::write(dir.path().join("det.onnx"), b"").unwrap();
        assert!(!STORE.is_complete(dir.path()));

        std::fs::write(dir.path().join("rec.onnx"), b"").unwrap();
        assert_eq!(STORE.locate(Some(dir.path())), Some(dir.path().to_path_buf()));
    }

    #[cfg(feature = "ocr-paddle")]
    #[test]
    fn test_default_dir_is_per_backend() {
        assert!(STORE.default_dir().ends_with("truckdoc-test-ocr/models"));
    }
}
