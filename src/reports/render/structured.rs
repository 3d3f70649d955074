use crate::reports::error::ReportError;
use crate::reports::model::Report;

use super::OutputFormat;

/// The report as a JSON value. Deserializes back into an identical [`Report`].
pub fn render_structured(report: &Report) -> Result<serde_json::Value, ReportError> {
    serde_json::to_value(report).map_err(|e| {
        log::error!("Failed to serialize {} report: {}", report.report_type, e);
        ReportError::render(OutputFormat::Structured, e.to_string())
    })
}
