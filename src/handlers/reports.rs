use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpResponse,
};

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::reports::{
    OutputFormat, RenderedOutput, ReportError, ReportParams, ReportType,
};
use crate::services::{resolve_scope, Claims};
use crate::AppState;

/// Compose and render one report.
///
/// `GET /api/v1/reports/{reportType}?startDate=..&endDate=..&format=..`
pub async fn get_report(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ReportParams>,
) -> Result<HttpResponse, AppError> {
    let report_type: ReportType = path.parse().map_err(AppError::BadRequest)?;

    let format = match query.format.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        Some(raw) => raw
            .parse::<OutputFormat>()
            .map_err(|e| ReportError::invalid(report_type, "format", e))?,
        None => OutputFormat::default(),
    };

    let scope = resolve_scope(&claims, state.composer.store()).await?;
    log::info!(
        "Staff {} ({}) requested {} report as {}",
        claims.staff_id(),
        claims.role,
        report_type,
        format
    );

    let report = state
        .composer
        .compose_report(report_type, &query, &scope)
        .await?;

    match state.renderer.render(&report, format)? {
        RenderedOutput::Structured(value) => Ok(HttpResponse::Ok().json(ApiResponse::success(value))),
        RenderedOutput::File(file) => Ok(HttpResponse::Ok()
            .content_type(file.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file.filename)],
            })
            .body(file.bytes)),
    }
}
