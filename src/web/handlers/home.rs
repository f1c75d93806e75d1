use axum::response::Html;

use crate::web::pages;

/// GET /
pub async fn index() -> Html<String> {
    Html(pages::index())
}
