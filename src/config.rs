//! Configuration management for truckdoc using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default mapping workbook, relative to the data directory.
pub const DEFAULT_MAPPING_FILE: &str = "license_mapping/車牌對照表、輪胎規格表114.03.03.xlsx";
/// Sheets tried in order when loading the mapping workbook.
pub const DEFAULT_MAPPING_SHEETS: [&str; 3] = ["1.2級車牌複製用", "工作表1", "Sheet1"];
/// Zero-based columns holding `PLATE(CODE)` tokens (B, D, F).
pub const DEFAULT_MAPPING_COLUMNS: [usize; 3] = [1, 3, 5];
pub const DEFAULT_REPORT_PREFIX: &str = "空白-1.2級檢查";
pub const DEFAULT_IMAGE_WIDTH_INCHES: f64 = 5.0;
pub const DEFAULT_OCR_BACKEND: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "chi_tra+eng";

const TEMPLATES_SUBDIR: &str = "templates";
const OUTPUT_SUBDIR: &str = "output";

/// Mapping workbook layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSettings {
    pub sheets: Vec<String>,
    pub columns: Vec<usize>,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            sheets: DEFAULT_MAPPING_SHEETS.iter().map(|s| s.to_string()).collect(),
            columns: DEFAULT_MAPPING_COLUMNS.to_vec(),
        }
    }
}

/// Output naming and layout of generated reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// File name prefix for generated reports.
    pub prefix: String,
    /// Display width of each inserted photograph.
    pub image_width_inches: f64,
    /// Fill `{{CHECKBOX_*}}` tokens (only some templates carry them).
    pub checkboxes: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_REPORT_PREFIX.to_string(),
            image_width_inches: DEFAULT_IMAGE_WIDTH_INCHES,
            checkboxes: false,
        }
    }
}

/// OCR engine selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrSettings {
    pub backend: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_OCR_BACKEND.to_string(),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            model_path: None,
        }
    }
}

impl OcrSettings {
    /// Engine options passed to the backend constructor.
    pub fn backend_config(&self) -> crate::ocr::OcrConfig {
        crate::ocr::OcrConfig {
            language: self.language.clone(),
            model_path: self.model_path.clone(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Directory holding `template_yellow.docx` and `template_white.docx`.
    pub templates_dir: PathBuf,
    /// Directory generated reports are written to.
    pub output_dir: PathBuf,
    /// Plate → code workbook.
    pub mapping_file: PathBuf,
    pub mapping: MappingSettings,
    pub report: ReportSettings,
    pub ocr: OcrSettings,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/Documents/truckdoc/ for user data
        // Falls back gracefully: Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("truckdoc");
        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            templates_dir: data_dir.join(TEMPLATES_SUBDIR),
            output_dir: data_dir.join(OUTPUT_SUBDIR),
            mapping_file: data_dir.join(DEFAULT_MAPPING_FILE),
            data_dir,
            mapping: MappingSettings::default(),
            report: ReportSettings::default(),
            ocr: OcrSettings::default(),
        }
    }

    /// Ensure the data, templates and output directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.data_dir, &self.templates_dir, &self.output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory {}: {}", dir.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// Apply `TRUCKDOC_*` overrides using the given variable lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(file) = var("TRUCKDOC_MAPPING_FILE") {
            tracing::debug!("Using TRUCKDOC_MAPPING_FILE from environment: {}", file);
            self.mapping_file = PathBuf::from(shellexpand::tilde(&file).as_ref());
        }
        if let Some(dir) = var("TRUCKDOC_OUTPUT_DIR") {
            tracing::debug!("Using TRUCKDOC_OUTPUT_DIR from environment: {}", dir);
            self.output_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }
        if let Some(backend) = var("TRUCKDOC_OCR_BACKEND") {
            tracing::debug!("Using TRUCKDOC_OCR_BACKEND from environment: {}", backend);
            self.ocr.backend = backend;
        }
    }
}

/// `[mapping]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct MappingConfig {
    /// Sheet names tried in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub sheets: Vec<String>,
    /// Zero-based column indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub columns: Vec<usize>,
}

/// `[report]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct ReportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width_inches: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkboxes: Option<bool>,
}

/// `[ocr]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct OcrConfig {
    /// Backend name: "tesseract" or "paddleocr".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Tesseract language string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Model directory for model-based backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Templates directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<String>,
    /// Output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Mapping workbook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_file: Option<String>,
    #[serde(default)]
    #[prefer(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    #[prefer(default)]
    pub report: ReportConfig,
    #[serde(default)]
    #[prefer(default)]
    pub ocr: OcrConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers truckdoc config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("truckdoc").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// Directories not set explicitly follow `data_dir`.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            let data_dir = self.resolve_path(data_dir, base_dir);
            *settings = Settings {
                mapping: settings.mapping.clone(),
                report: settings.report.clone(),
                ocr: settings.ocr.clone(),
                ..Settings::with_data_dir(data_dir)
            };
        }
        if let Some(ref dir) = self.templates_dir {
            settings.templates_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(ref file) = self.mapping_file {
            settings.mapping_file = self.resolve_path(file, base_dir);
        }

        if !self.mapping.sheets.is_empty() {
            settings.mapping.sheets = self.mapping.sheets.clone();
        }
        if !self.mapping.columns.is_empty() {
            settings.mapping.columns = self.mapping.columns.clone();
        }

        if let Some(ref prefix) = self.report.prefix {
            settings.report.prefix = prefix.clone();
        }
        if let Some(width) = self.report.image_width_inches {
            settings.report.image_width_inches = width;
        }
        if let Some(checkboxes) = self.report.checkboxes {
            settings.report.checkboxes = checkboxes;
        }

        if let Some(ref backend) = self.ocr.backend {
            settings.ocr.backend = backend.clone();
        }
        if let Some(ref language) = self.ocr.language {
            settings.ocr.language = language.clone();
        }
        if let Some(ref model_path) = self.ocr.model_path {
            settings.ocr.model_path = Some(self.resolve_path(model_path, base_dir));
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}; using defaults", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let mut settings = Settings::default();

    // Determine base directory for resolving relative paths
    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // TRUCKDOC_* environment variables take precedence over the file
    settings.apply_env_overrides(|name| std::env::var(name).ok());

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_follow_data_dir() {
        let settings = Settings::with_data_dir(PathBuf::from("/srv/truckdoc"));
        assert_eq!(settings.templates_dir, PathBuf::from("/srv/truckdoc/templates"));
        assert_eq!(settings.output_dir, PathBuf::from("/srv/truckdoc/output"));
        assert!(settings.mapping_file.starts_with("/srv/truckdoc/license_mapping"));
        assert_eq!(settings.mapping.columns, vec![1, 3, 5]);
        assert_eq!(settings.mapping.sheets[0], "1.2級車牌複製用");
        assert_eq!(settings.ocr.backend, "tesseract");
    }

    #[test]
    fn test_toml_config_applies_relative_to_base() {
        let toml = r#"
            data_dir = "data"
            output_dir = "/tmp/reports"

            [mapping]
            sheets = ["Plates"]

            [report]
            image_width_inches = 4.5
            checkboxes = true

            [ocr]
            backend = "paddleocr"
        "#;
        let config = Config::parse(toml, Path::new("truckdoc.toml")).unwrap();
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/truckdoc"));

        assert_eq!(settings.data_dir, PathBuf::from("/etc/truckdoc/data"));
        assert_eq!(settings.templates_dir, PathBuf::from("/etc/truckdoc/data/templates"));
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(settings.mapping.sheets, vec!["Plates"]);
        assert_eq!(settings.mapping.columns, vec![1, 3, 5]);
        assert_eq!(settings.report.image_width_inches, 4.5);
        assert!(settings.report.checkboxes);
        assert_eq!(settings.report.prefix, DEFAULT_REPORT_PREFIX);
        assert_eq!(settings.ocr.backend, "paddleocr");
    }

    #[test]
    fn test_yaml_and_json_configs() {
        let yaml = "report:\n  prefix: 檢查\n";
        let config = Config::parse(yaml, Path::new("truckdoc.yaml")).unwrap();
        assert_eq!(config.report.prefix.as_deref(), Some("檢查"));

        let json = r#"{"mapping": {"columns": [0, 2]}}"#;
        let config = Config::parse(json, Path::new("truckdoc.json")).unwrap();
        assert_eq!(config.mapping.columns, vec![0, 2]);
    }

    #[test]
    fn test_bad_config_is_reported() {
        let err = Config::parse("data_dir = [", Path::new("x.toml")).unwrap_err();
        assert!(err.starts_with("Failed to parse TOML config"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TRUCKDOC_OUTPUT_DIR", "/var/out"),
            ("TRUCKDOC_OCR_BACKEND", "paddleocr"),
            ("TRUCKDOC_MAPPING_FILE", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::with_data_dir(PathBuf::from("/d"));
        settings.apply_env_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.output_dir, PathBuf::from("/var/out"));
        assert_eq!(settings.ocr.backend, "paddleocr");
        assert_eq!(settings.mapping_file, PathBuf::from("/d").join(DEFAULT_MAPPING_FILE));
    }

    #[tokio::test]
    async fn test_load_from_path_records_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("truckdoc.toml");
        std::fs::write(&path, "templates_dir = \"tpl\"\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));

        let (settings, _) = load_settings_with_options(LoadOptions {
            config_path: Some(path),
            use_cwd: false,
        })
        .await;
        assert_eq!(settings.templates_dir, dir.path().join("tpl"));
    }
}
