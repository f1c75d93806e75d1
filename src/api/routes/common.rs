use axum::{http::StatusCode, Json};
use log::error;
use serde::Serialize;

use crate::error::StockError;

/// Error response structure with user-friendly message
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP status for an error. Storage and unexpected failures are server errors.
pub fn status_for(err: &StockError) -> StatusCode {
    match err {
        StockError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StockError::NotFound(_) => StatusCode::NOT_FOUND,
        StockError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message safe to show a client. Details of server-side failures are logged
/// here and replaced by a generic message.
pub fn client_message(err: &StockError, context: &str) -> String {
    match err {
        StockError::Validation(msg) | StockError::NotFound(msg) | StockError::Conflict(msg) => {
            msg.clone()
        }
        _ if err.is_storage() => {
            error!("{}: {}", context, err);
            "Database error occurred".to_string()
        }
        _ => {
            error!("{}: {}", context, err);
            "An unexpected error occurred".to_string()
        }
    }
}

pub fn json_error(err: StockError, context: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: client_message(&err, context),
        }),
    )
}
