use axum::{http::StatusCode, response::Html};

use crate::api::routes::common::{client_message, status_for};
use crate::error::StockError;
use crate::web::pages;

/// Full-page error for HTML routes that have no form to re-render.
pub fn html_error(err: StockError, context: &str) -> (StatusCode, Html<String>) {
    (
        status_for(&err),
        Html(pages::error_page(&client_message(&err, context))),
    )
}

/// Re-renders a submission form with the error above it. Storage failures get
/// the generic error page instead.
pub fn form_error<F>(err: StockError, context: &str, render_form: F) -> (StatusCode, Html<String>)
where
    F: FnOnce(&str) -> String,
{
    if err.is_storage() {
        return html_error(err, context);
    }

    let status = status_for(&err);
    let message = client_message(&err, context);
    (status, Html(render_form(&message)))
}
