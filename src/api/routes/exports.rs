use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::common::{json_error, ErrorResponse};
use super::state::AppState;
use crate::reports::{Report, ReportKind, XLSX_MIME};

fn download(state: &AppState, kind: ReportKind) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let mut conn = state
        .db
        .get_connection()
        .map_err(|e| json_error(e, "Failed to get database connection"))?;

    let report = Report::generate(&mut conn, kind)
        .map_err(|e| json_error(e, "Failed to generate report"))?;
    let bytes = report
        .to_xlsx()
        .map_err(|e| json_error(e, "Failed to render report"))?;

    let filename = kind.filename(chrono::Local::now().naive_local());
    log::info!("Exporting {} ({} rows)", filename, report.rows().len());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /export_stock
/// Downloads the stock report as an .xlsx workbook
pub async fn export_stock(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    download(&state, ReportKind::Stock)
}

/// GET /export_audit
/// Downloads the reconciled audit report as an .xlsx workbook
pub async fn export_audit(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    download(&state, ReportKind::Audit)
}
