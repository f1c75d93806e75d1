use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::database::Database;
use crate::error::StockError;
use crate::web::handlers;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

pub struct WebServer {
    host: String,
    port: u16,
    db: Database,
}

impl WebServer {
    pub fn new(host: String, port: u16, db: Database) -> Self {
        Self { host, port, db }
    }

    pub async fn start(&self) -> Result<(), StockError> {
        let app = create_router(AppState::new(self.db.clone()));

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| StockError::Error(format!("Invalid address: {}", e)))?;

        println!("phonestock server starting on http://{}", addr);
        println!("   Database: {}", self.db.path().display());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| StockError::Error(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("Server ready to handle requests on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
                log::info!("Shutdown signal received, stopping server");
                println!("\nShutdown signal received - stopping server gracefully...");
            })
            .await
            .map_err(|e| StockError::Error(format!("Server error: {}", e)))?;

        log::info!("Server shutdown complete");
        println!("   Server stopped");

        Ok(())
    }
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::home::index))
        .route(
            "/add_purchase",
            get(handlers::purchases::purchase_form).post(handlers::purchases::add_purchase),
        )
        .route(
            "/add_sale",
            get(handlers::sales::sale_form).post(handlers::sales::add_sale),
        )
        .route("/view_stock", get(handlers::stock::view_stock))
        .route("/audit", get(handlers::audit::audit_page))

        // Audit submission
        .route("/log_audit", post(api::audit::log_audit))

        // Spreadsheet downloads
        .route("/export_stock", get(api::exports::export_stock))
        .route("/export_audit", get(api::exports::export_audit))

        // JSON API
        .route("/api/inventory", get(api::inventory::get_inventory))
        .route("/api/app-info", get(api::app::get_app_info))

        // Health check and embedded assets
        .route("/health", get(health_check))
        .route("/static/{*path}", get(static_handler))

        // Add state for handlers
        .with_state(app_state)
}

async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

// Handler for embedded static files
async fn static_handler(Path(path): Path<String>) -> Response {
    match Asset::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_owned())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Waits for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received SIGINT (Ctrl+C)");
        },
        _ = terminate => {
            log::info!("Received SIGTERM");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit_log::AuditLog;
    use crate::database::test_support::temp_db;
    use crate::stock::{StockItem, StockStatus};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Database, Router) {
        let (dir, db) = temp_db();
        let app = create_router(AppState::new(db.clone()));
        (dir, db, app)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    const PURCHASE_FORM: &str = "imei=356938035643809&product=Phone&company=Acme&model=X1\
        &specification=8GB%2F128GB&purchase_date=2024-01-01&received_from=Wholesale+Ltd";

    #[tokio::test]
    async fn test_pages_render() {
        let (_dir, _db, app) = test_app();

        for uri in ["/", "/add_purchase", "/add_sale", "/view_stock", "/audit"] {
            let (status, headers, _) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::OK, "GET {}", uri);
            assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        }
    }

    #[tokio::test]
    async fn test_add_purchase_redirects_and_persists() {
        let (_dir, db, app) = test_app();

        let (status, headers, _) = send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/view_stock");

        let conn = db.get_connection().unwrap();
        let item = StockItem::get_by_imei(&conn, "356938035643809").unwrap().unwrap();
        assert_eq!(item.specification(), "8GB/128GB");
        assert_eq!(item.received_from(), "Wholesale Ltd");
        assert_eq!(item.status(), StockStatus::InStock);

        let (_, _, body) = send(&app, get("/view_stock")).await;
        assert!(String::from_utf8(body).unwrap().contains("356938035643809"));
    }

    #[tokio::test]
    async fn test_add_purchase_missing_field_rerenders_form() {
        let (_dir, db, app) = test_app();

        let (status, _, body) = send(
            &app,
            form_post("/add_purchase", "imei=123&product=Phone&company=Acme"),
        )
        .await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("Missing required fields: model, specification, purchase_date, received_from"));
        assert!(html.contains(r#"name="imei" value="123""#));

        let conn = db.get_connection().unwrap();
        assert!(StockItem::list_all(&conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_purchase_duplicate_is_conflict() {
        let (_dir, _db, app) = test_app();

        send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;
        let (status, _, body) = send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(String::from_utf8(body).unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn test_add_sale_flow() {
        let (_dir, db, app) = test_app();
        send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;

        let sale = "imei=356938035643809&sold_to=Alice&sold_date=2024-01-01";
        let (status, headers, _) = send(&app, form_post("/add_sale", sale)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/view_stock");

        let conn = db.get_connection().unwrap();
        let item = StockItem::get_by_imei(&conn, "356938035643809").unwrap().unwrap();
        assert_eq!(item.status(), StockStatus::Sold);
        assert_eq!(item.sold_to(), "Alice");
        assert_eq!(item.sold_date(), "2024-01-01");

        // Selling again is refused
        let again = "imei=356938035643809&sold_to=Bob&sold_date=2024-02-01";
        let (status, _, _) = send(&app, form_post("/add_sale", again)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_add_sale_unknown_imei_is_not_found() {
        let (_dir, _db, app) = test_app();

        let (status, _, body) = send(
            &app,
            form_post("/add_sale", "imei=000&sold_to=Alice&sold_date=2024-01-01"),
        )
        .await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("No item with IMEI 000 in stock"));
        assert!(html.contains(r#"name="sold_to" value="Alice""#));
    }

    #[tokio::test]
    async fn test_log_audit() {
        let (_dir, db, app) = test_app();

        let (status, _, body) = send(
            &app,
            json_post(
                "/log_audit",
                serde_json::json!({"imei": "123", "status": "Audited", "audit_date": "2024-05-01 10:00:00"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));

        let conn = db.get_connection().unwrap();
        let entries = AuditLog::list_all(&conn).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].imei(), "123");
        assert_eq!(entries[0].model(), None);
    }

    #[tokio::test]
    async fn test_log_audit_rejects_bad_status() {
        let (_dir, _db, app) = test_app();

        let (status, _, body) = send(
            &app,
            json_post(
                "/log_audit",
                serde_json::json!({"imei": "123", "status": "Lost", "audit_date": "2024-05-01"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("Invalid audit status"));
    }

    #[tokio::test]
    async fn test_log_audit_malformed_bodies_answer_json() {
        let (_dir, db, app) = test_app();

        let plain_text = Request::builder()
            .method("POST")
            .uri("/log_audit")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("123"))
            .unwrap();
        let not_json = Request::builder()
            .method("POST")
            .uri("/log_audit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let null_status = json_post(
            "/log_audit",
            serde_json::json!({"imei": "123", "status": null, "audit_date": "2024-05-01"}),
        );

        for request in [plain_text, not_json, null_status] {
            let (status, headers, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("application/json"));

            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["success"], false);
            assert!(!json["error"].as_str().unwrap().is_empty());
        }

        let conn = db.get_connection().unwrap();
        assert!(AuditLog::list_all(&conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_log_audit_accepts_numeric_imei() {
        let (_dir, db, app) = test_app();

        let (status, _, _) = send(
            &app,
            json_post(
                "/log_audit",
                serde_json::json!({"imei": 356938035643809u64, "status": "Audited", "audit_date": "2024-05-01 10:00:00"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let conn = db.get_connection().unwrap();
        let entries = AuditLog::list_all(&conn).unwrap();
        assert_eq!(entries[0].imei(), "356938035643809");
    }

    #[tokio::test]
    async fn test_api_inventory_is_positional() {
        let (_dir, _db, app) = test_app();
        send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;
        send(
            &app,
            form_post(
                "/add_purchase",
                "imei=2&product=Tablet&company=Acme&model=T1&specification=4GB&purchase_date=2024-01-02&received_from=Shop",
            ),
        )
        .await;

        let (status, _, body) = send(&app, get("/api/inventory")).await;
        assert_eq!(status, StatusCode::OK);

        let rows: Vec<Vec<String>> = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == StockItem::COLUMN_COUNT));
        assert_eq!(
            rows[1],
            vec!["2", "Tablet", "Acme", "T1", "4GB", "2024-01-02", "Shop", "", "In Stock", "", ""]
        );
    }

    #[tokio::test]
    async fn test_exports_are_attachments() {
        let (_dir, _db, app) = test_app();
        send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;

        for (uri, prefix) in [
            ("/export_stock", "attachment; filename=\"stock_inventory_"),
            ("/export_audit", "attachment; filename=\"audit_report_"),
        ] {
            let (status, headers, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::OK, "GET {}", uri);
            assert_eq!(headers[header::CONTENT_TYPE], crate::reports::XLSX_MIME);

            let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
            assert!(disposition.starts_with(prefix), "{}", disposition);
            assert!(disposition.ends_with(".xlsx\""), "{}", disposition);
            assert_eq!(&body[..2], b"PK");
        }
    }

    #[tokio::test]
    async fn test_audit_page_shows_missing_items() {
        let (_dir, _db, app) = test_app();
        send(&app, form_post("/add_purchase", PURCHASE_FORM)).await;

        let (_, _, body) = send(&app, get("/audit")).await;
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("Missing – Not Scanned"));
        assert!(html.contains(r#"data-imei="356938035643809""#));
    }

    #[tokio::test]
    async fn test_static_assets() {
        let (_dir, _db, app) = test_app();

        let (status, headers, _) = send(&app, get("/static/audit.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE].to_str().unwrap().contains("javascript"));

        let (status, _, _) = send(&app, get("/static/nope.txt")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_app_info_and_health() {
        let (_dir, _db, app) = test_app();

        let (status, _, body) = send(&app, get("/api/app-info")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["name"], "phonestock");
        assert_eq!(json["schema_version"], "1");

        let (status, _, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
