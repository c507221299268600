//! Report generation: template selection, rendering and saving.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::Settings;
use crate::docx::{Document, DocxError};
use crate::models::{TruckType, UnknownTruckType};

use super::form::ReportFields;
use super::placeholders::{PlaceholderMap, IMAGE_1, IMAGE_2};
use super::renderer::{render, ImagePlaceholder, RenderIssue};

/// Errors that abort a render. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid truck type selection: {0}")]
    InvalidSelection(#[from] UnknownTruckType),

    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Document error: {0}")]
    Docx(#[from] DocxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to produce one report.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub fields: ReportFields,
    /// Truck type as selected by the operator.
    pub truck_type: String,
    pub image1: Option<PathBuf>,
    pub image2: Option<PathBuf>,
}

/// A saved report plus the problems that did not stop it.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub issues: Vec<RenderIssue>,
}

/// Output file name: `<prefix>-<code or XXX>-<suffix>.docx`.
pub fn report_filename(prefix: &str, code: Option<&str>, truck: TruckType) -> String {
    let code = code.filter(|c| !c.is_empty()).unwrap_or("XXX");
    format!("{}-{}-{}.docx", prefix, code, truck.filename_suffix())
}

#[derive(Debug, Clone)]
pub struct ReportGenerator {
    templates_dir: PathBuf,
    output_dir: PathBuf,
    prefix: String,
    image_width_inches: f64,
    checkboxes: bool,
}

impl ReportGenerator {
    pub fn new(templates_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output_dir: output_dir.into(),
            prefix: crate::config::DEFAULT_REPORT_PREFIX.to_string(),
            image_width_inches: crate::config::DEFAULT_IMAGE_WIDTH_INCHES,
            checkboxes: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.templates_dir, &settings.output_dir)
            .with_prefix(settings.report.prefix.clone())
            .with_image_width(settings.report.image_width_inches)
            .with_checkboxes(settings.report.checkboxes)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_image_width(mut self, inches: f64) -> Self {
        self.image_width_inches = inches;
        self
    }

    pub fn with_checkboxes(mut self, enabled: bool) -> Self {
        self.checkboxes = enabled;
        self
    }

    pub fn template_path(&self, truck: TruckType) -> PathBuf {
        self.templates_dir.join(truck.template_filename())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn generate(&self, request: &ReportRequest) -> Result<RenderOutcome, RenderError> {
        let truck: TruckType = request.truck_type.parse()?;

        let template = self.template_path(truck);
        if !template.is_file() {
            return Err(RenderError::TemplateNotFound(template));
        }
        tracing::info!("Using template {}", template.display());
        let mut doc = Document::open(&template)?;

        let text = PlaceholderMap::for_report(&request.fields, truck, self.checkboxes);
        let images: Vec<ImagePlaceholder> = [(IMAGE_1, &request.image1), (IMAGE_2, &request.image2)]
            .into_iter()
            .filter_map(|(token, path)| {
                path.as_ref().map(|path| ImagePlaceholder {
                    token: token.to_string(),
                    path: path.clone(),
                    width_inches: self.image_width_inches,
                })
            })
            .collect();

        let issues = render(&mut doc, &text, &images);

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(report_filename(
            &self.prefix,
            request.fields.code.as_deref(),
            truck,
        ));
        doc.save(&path)?;
        tracing::info!("Report written to {}", path.display());

        Ok(RenderOutcome { path, issues })
    }
}
