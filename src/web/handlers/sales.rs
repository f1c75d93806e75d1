use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    Form,
};

use super::common::form_error;
use crate::api::AppState;
use crate::stock::{NewSale, StockItem};
use crate::web::pages;

/// GET /add_sale
pub async fn sale_form() -> Html<String> {
    Html(pages::sale_form(&NewSale::default(), None))
}

/// POST /add_sale
/// Marks an in-stock item as sold. Unknown IMEIs and items that are already
/// sold re-render the form with the reason.
pub async fn add_sale(
    State(state): State<AppState>,
    Form(sale): Form<NewSale>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let render = |msg: &str| pages::sale_form(&sale, Some(msg));

    let mut conn = state
        .db
        .get_connection()
        .map_err(|e| form_error(e, "Failed to get database connection", render))?;

    StockItem::record_sale(&mut conn, &sale)
        .map_err(|e| form_error(e, "Failed to record sale", render))?;

    Ok(Redirect::to("/view_stock"))
}
