use axum::{extract::State, http::StatusCode, response::Html};

use super::common::html_error;
use crate::api::AppState;
use crate::stock::StockItem;
use crate::web::pages;

/// GET /view_stock
pub async fn view_stock(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let conn = state
        .db
        .get_connection()
        .map_err(|e| html_error(e, "Failed to get database connection"))?;

    let items = StockItem::list_all(&conn).map_err(|e| html_error(e, "Failed to list stock"))?;

    Ok(Html(pages::stock_table(&items)))
}
