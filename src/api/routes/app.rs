use axum::{extract::State, Json};
use serde::Serialize;

use super::state::AppState;

/// Response structure for app information
#[derive(Debug, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub schema_version: String,
    pub build_timestamp: String,
}

/// GET /api/app-info
///
/// Returns application version and build information
pub async fn get_app_info(State(state): State<AppState>) -> Json<AppInfo> {
    let schema_version = state
        .db
        .get_schema_version()
        .unwrap_or_else(|_| "unknown".to_string());

    Json(AppInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version,
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
    })
}
