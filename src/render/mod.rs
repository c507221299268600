//! Report rendering: placeholder maps, substitution and output.

mod form;
pub mod placeholders;
mod renderer;
mod report;

pub use form::{FormError, ReportFields, ReportForm};
pub use placeholders::PlaceholderMap;
pub use renderer::{render, substitute_image, substitute_text, ImagePlaceholder, RenderIssue};
pub use report::{report_filename, RenderError, RenderOutcome, ReportGenerator, ReportRequest};
