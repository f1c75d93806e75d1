use axum::{extract::State, http::StatusCode, response::Html};

use super::common::html_error;
use crate::api::AppState;
use crate::audit_log::AuditLog;
use crate::reconcile::Reconciler;
use crate::stock::StockItem;
use crate::web::pages;

/// GET /audit
/// Scanning page listing every item with its current audit outcome
pub async fn audit_page(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut conn = state
        .db
        .get_connection()
        .map_err(|e| html_error(e, "Failed to get database connection"))?;

    let tx = conn
        .transaction()
        .map_err(|e| html_error(e.into(), "Failed to begin read"))?;
    let items = StockItem::list_all(&tx).map_err(|e| html_error(e, "Failed to list stock"))?;
    let entries = AuditLog::list_all(&tx).map_err(|e| html_error(e, "Failed to list audit log"))?;
    drop(tx);

    let reconciled = Reconciler::reconcile(&items, &entries);
    let summary = Reconciler::summarize(&reconciled);

    Ok(Html(pages::audit_page(&reconciled, &summary)))
}
