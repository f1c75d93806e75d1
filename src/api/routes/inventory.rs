use axum::{extract::State, http::StatusCode, Json};

use super::common::{json_error, ErrorResponse};
use super::state::AppState;
use crate::stock::StockItem;

/// GET /api/inventory
/// Returns every stock item as a positional array in storage column order
pub async fn get_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<Vec<String>>>, (StatusCode, Json<ErrorResponse>)> {
    let conn = state
        .db
        .get_connection()
        .map_err(|e| json_error(e, "Failed to get database connection"))?;

    let items =
        StockItem::list_all(&conn).map_err(|e| json_error(e, "Failed to list inventory"))?;

    Ok(Json(items.iter().map(StockItem::to_row).collect()))
}
