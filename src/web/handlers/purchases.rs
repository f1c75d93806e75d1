use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    Form,
};

use super::common::form_error;
use crate::api::AppState;
use crate::stock::{NewPurchase, StockItem};
use crate::web::pages;

/// GET /add_purchase
pub async fn purchase_form() -> Html<String> {
    Html(pages::purchase_form(&NewPurchase::default(), None))
}

/// POST /add_purchase
/// Records a purchase and redirects to the stock list. Invalid or duplicate
/// submissions re-render the form with what the user entered.
pub async fn add_purchase(
    State(state): State<AppState>,
    Form(purchase): Form<NewPurchase>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let render = |msg: &str| pages::purchase_form(&purchase, Some(msg));

    let conn = state
        .db
        .get_connection()
        .map_err(|e| form_error(e, "Failed to get database connection", render))?;

    StockItem::create(&conn, &purchase)
        .map_err(|e| form_error(e, "Failed to record purchase", render))?;

    Ok(Redirect::to("/view_stock"))
}
