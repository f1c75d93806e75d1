use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::common::{client_message, status_for};
use super::state::AppState;
use crate::audit_log::{AuditLog, NewAuditEntry};
use crate::error::StockError;

/// Response structure for POST /log_audit
#[derive(Debug, Serialize)]
pub struct LogAuditResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn failure(err: StockError) -> (StatusCode, Json<LogAuditResponse>) {
    // Scanner submissions are JSON; malformed input is a plain bad request
    let status = match err {
        StockError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => status_for(&err),
    };

    (
        status,
        Json(LogAuditResponse {
            success: false,
            error: Some(client_message(&err, "Failed to log audit scan")),
        }),
    )
}

/// POST /log_audit
/// Appends one scan event to the audit log. Bodies that are not valid JSON
/// get the same `{"success": false}` shape as rejected entries.
pub async fn log_audit(
    State(state): State<AppState>,
    payload: Result<Json<NewAuditEntry>, JsonRejection>,
) -> Result<Json<LogAuditResponse>, (StatusCode, Json<LogAuditResponse>)> {
    let Json(req) = payload.map_err(|rejection| failure(StockError::Validation(rejection.body_text())))?;

    let conn = state.db.get_connection().map_err(failure)?;

    AuditLog::append(&conn, &req).map_err(failure)?;

    Ok(Json(LogAuditResponse {
        success: true,
        error: None,
    }))
}
