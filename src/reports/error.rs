use std::time::Duration;

use thiserror::Error;

use crate::reports::model::ReportType;
use crate::reports::store::StoreError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid parameter '{parameter}' for {report_type} report: {message}")]
    InvalidParameter {
        report_type: ReportType,
        parameter: &'static str,
        message: String,
    },

    #[error("Access denied for {report_type} report: {message}")]
    AccessDenied {
        report_type: ReportType,
        message: String,
    },

    #[error("Failed to {operation} for {report_type} report: {source}")]
    UpstreamFetch {
        report_type: ReportType,
        operation: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to render report as {format}: {message}")]
    RenderFailure { format: String, message: String },
}

impl ReportError {
    pub fn invalid(
        report_type: ReportType,
        parameter: &'static str,
        message: impl Into<String>,
    ) -> Self {
        ReportError::InvalidParameter {
            report_type,
            parameter,
            message: message.into(),
        }
    }

    pub fn denied(report_type: ReportType, message: impl Into<String>) -> Self {
        ReportError::AccessDenied {
            report_type,
            message: message.into(),
        }
    }

    /// Adapter for `map_err` on store calls.
    pub fn fetch(
        report_type: ReportType,
        operation: &'static str,
    ) -> impl FnOnce(StoreError) -> Self {
        move |source| {
            log::error!("{} report: failed to {}: {}", report_type, operation, source);
            ReportError::UpstreamFetch {
                report_type,
                operation: operation.to_string(),
                source,
            }
        }
    }

    pub fn timed_out(report_type: ReportType, limit: Duration) -> Self {
        log::error!(
            "{} report: composition exceeded {}ms",
            report_type,
            limit.as_millis()
        );
        ReportError::UpstreamFetch {
            report_type,
            operation: "compose (timed out)".to_string(),
            source: StoreError::Unavailable(format!("timed out after {}ms", limit.as_millis())),
        }
    }

    pub fn render(format: impl std::fmt::Display, message: impl Into<String>) -> Self {
        ReportError::RenderFailure {
            format: format.to_string(),
            message: message.into(),
        }
    }
}
