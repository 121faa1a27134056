//! # Kantin API
//!
//! HTTP/JSON boundary for the canteen ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kantin API Routes                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Stock         │  │  Checkout      │  │  Reports (admin)           ││
//! │  │                │  │                │  │                            ││
//! │  │ • transfer     │  │ • checkout     │  │ • daily / monthly / yearly ││
//! │  │ • restock      │  │ • history      │  │ • stock-recap              ││
//! │  │ • counter list │  │ • by invoice   │  │ • insights                 ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  Expenses      │  │  Health        │                                │
//! │  │ • record       │  │ • /health      │                                │
//! │  │ • list (admin) │  │                │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  x-actor-* headers ─► CurrentActor ─► capability check ─► kantin-db    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `KANTIN_HTTP_PORT` - HTTP port (default: 8000)
//! - `KANTIN_DATABASE_PATH` - SQLite file (default: ./kantin.db)
//! - `KANTIN_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `RUST_LOG` - Log filter (default: info,kantin=debug)

pub mod actor;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use kantin_db::Database;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full route table.
pub fn router(state: AppState) -> Router {
    use handlers::{checkout, expenses, health, insights, reports, stock, transactions};

    let api = Router::new()
        .route("/stock/transfer", post(stock::transfer))
        .route("/stock/restock", post(stock::restock))
        .route("/stock/counter", get(stock::counter_products))
        .route("/checkout", post(checkout::checkout))
        .route("/transactions", get(transactions::history))
        .route("/transactions/:invoice", get(transactions::by_invoice))
        .route("/expenses", post(expenses::record).get(expenses::list))
        .route("/reports/daily", get(reports::daily))
        .route("/reports/monthly", get(reports::monthly))
        .route("/reports/yearly", get(reports::yearly))
        .route("/reports/stock-recap", get(reports::stock_recap))
        .route("/insights/sales", get(insights::sales))
        .route("/insights/restock", get(insights::restock))
        .route("/insights/stockout", get(insights::stockout));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// =============================================================================
// Route Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, ACTOR_USERNAME_HEADER};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use kantin_core::{Money, NewWarehouseProduct};
    use kantin_db::DbConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn setup() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (router(AppState::new(db.clone())), db)
    }

    /// Warehouse product with `counter` units already moved to the counter.
    /// Returns the counter product id.
    async fn stocked(db: &Database, name: &str, price: i64, counter: i64) -> String {
        let product = db
            .stock()
            .insert_warehouse_product(&NewWarehouseProduct {
                name: name.to_string(),
                category: "Minuman".to_string(),
                price: Money::from_major(price),
                stock: 100,
                unit: "botol".to_string(),
            })
            .await
            .unwrap();
        db.stock()
            .transfer_to_counter(&product.id, counter)
            .await
            .unwrap()
            .counter_product_id
    }

    fn request(method: Method, uri: &str, role: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder
                .header(ACTOR_ID_HEADER, format!("u-{role}"))
                .header(ACTOR_USERNAME_HEADER, role)
                .header(ACTOR_ROLE_HEADER, role);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = setup().await;
        let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], true);
        assert_eq!(body["data"]["database"], "ok");
    }

    #[tokio::test]
    async fn test_checkout_returns_receipt() {
        let (app, db) = setup().await;
        let teh = stocked(&db, "Teh Botol", 5_000, 10).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/checkout",
                Some("cashier"),
                Some(json!({
                    "items": [{ "product_id": teh, "qty": 2 }],
                    "cash_given": Money::from_major(20_000).minor(),
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "Checkout complete");

        let transaction = &body["data"]["transaction"];
        assert!(transaction["invoice"].as_str().unwrap().starts_with("INV-"));
        assert_eq!(transaction["total"], Money::from_major(10_000).minor());
        assert_eq!(transaction["change"], Money::from_major(10_000).minor());
        assert_eq!(transaction["payment_method"], "cash");
        assert_eq!(body["data"]["items"][0]["name"], "Teh Botol");

        let counter = db.stock().get_counter_product(&teh).await.unwrap().unwrap();
        assert_eq!(counter.stock, 8);
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_is_bad_request() {
        let (app, db) = setup().await;
        let teh = stocked(&db, "Teh Botol", 5_000, 3).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/checkout",
                Some("cashier"),
                Some(json!({
                    "items": [{ "product_id": teh, "qty": 5 }],
                    "cash_given": Money::from_major(50_000).minor(),
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], false);
        assert!(body["error"].as_str().unwrap().contains("Teh Botol"));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_checkout_unknown_product_is_not_found() {
        let (app, _db) = setup().await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/checkout",
                Some("cashier"),
                Some(json!({
                    "items": [{ "product_id": "missing", "qty": 1 }],
                    "cash_given": 100,
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], false);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let (app, _db) = setup().await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/checkout",
                Some("cashier"),
                Some(json!({ "items": "nope" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], false);
    }

    #[tokio::test]
    async fn test_missing_actor_is_unauthorized() {
        let (app, _db) = setup().await;
        let (status, body) =
            send(&app, request(Method::GET, "/api/transactions", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], false);
    }

    #[tokio::test]
    async fn test_reports_are_admin_only() {
        let (app, _db) = setup().await;

        let (status, _) = send(
            &app,
            request(Method::GET, "/api/reports/daily", Some("cashier"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            request(
                Method::GET,
                "/api/reports/daily?date=2026-10-16",
                Some("admin"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["date"], "2026-10-16");
        assert_eq!(body["data"]["transaction_count"], 0);
    }

    #[tokio::test]
    async fn test_monthly_report_month_without_year() {
        use chrono::{Datelike, Utc};

        let (app, _db) = setup().await;
        let this_year = Utc::now().year();

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/reports/monthly?month=3", Some("admin"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["year"], this_year);
        assert_eq!(body["data"]["month"], 3);

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/reports/yearly?month=13", Some("admin"), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], false);
    }

    #[tokio::test]
    async fn test_transfer_and_restock() {
        let (app, db) = setup().await;
        let product = db
            .stock()
            .insert_warehouse_product(&NewWarehouseProduct {
                name: "Air Mineral".to_string(),
                category: "Minuman".to_string(),
                price: Money::from_major(4_000),
                stock: 50,
                unit: "botol".to_string(),
            })
            .await
            .unwrap();

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/stock/transfer",
                Some("cashier"),
                Some(json!({ "warehouse_product_id": product.id, "quantity": 20 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["warehouse_stock"], 30);
        assert_eq!(body["data"]["counter_stock"], 20);

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/stock/transfer",
                Some("cashier"),
                Some(json!({ "warehouse_product_id": product.id, "quantity": 31 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/stock/restock",
                Some("admin"),
                Some(json!({ "warehouse_product_id": product.id, "quantity": 10 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["warehouse_stock"], 40);
    }

    #[tokio::test]
    async fn test_expenses_record_and_list() {
        let (app, _db) = setup().await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/expenses",
                Some("cashier"),
                Some(json!({ "description": "Beli es batu", "amount": 500_000 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["cashier_username"], "cashier");

        let (status, _) =
            send(&app, request(Method::GET, "/api/expenses", Some("cashier"), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&app, request(Method::GET, "/api/expenses", Some("admin"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cashier_cannot_read_foreign_invoice() {
        let (app, db) = setup().await;
        let teh = stocked(&db, "Teh Botol", 5_000, 10).await;

        let (_, body) = send(
            &app,
            request(
                Method::POST,
                "/api/checkout",
                Some("admin"),
                Some(json!({
                    "items": [{ "product_id": teh, "qty": 1 }],
                    "cash_given": Money::from_major(5_000).minor(),
                })),
            ),
        )
        .await;
        let invoice = body["data"]["transaction"]["invoice"].as_str().unwrap().to_string();
        let uri = format!("/api/transactions/{invoice}");

        let (status, _) = send(&app, request(Method::GET, &uri, Some("cashier"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, request(Method::GET, &uri, Some("admin"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["transaction"]["invoice"], invoice);
    }
}
