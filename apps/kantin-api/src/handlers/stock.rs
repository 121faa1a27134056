//! Stock movements between the warehouse and the counter.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use kantin_core::Capability;

use crate::actor::CurrentActor;
use crate::error::ApiResult;
use crate::response;
use crate::AppState;

/// Body of `POST /api/stock/transfer` and `POST /api/stock/restock`.
#[derive(Debug, Deserialize)]
pub struct StockMoveBody {
    pub warehouse_product_id: String,
    pub quantity: i64,
}

/// `POST /api/stock/transfer`
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    payload: Result<Json<StockMoveBody>, JsonRejection>,
) -> ApiResult<Response> {
    actor.require(Capability::TransferStock)?;
    let Json(body) = payload?;

    let outcome = state
        .db
        .stock()
        .transfer_to_counter(&body.warehouse_product_id, body.quantity)
        .await?;

    Ok(response::ok_with_message(
        format!("Moved {} x {} to the counter", outcome.quantity, outcome.name),
        outcome,
    ))
}

/// `POST /api/stock/restock`
pub async fn restock(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    payload: Result<Json<StockMoveBody>, JsonRejection>,
) -> ApiResult<Response> {
    actor.require(Capability::RestockWarehouse)?;
    let Json(body) = payload?;

    let outcome = state
        .db
        .stock()
        .restock_warehouse(&body.warehouse_product_id, body.quantity)
        .await?;

    Ok(response::ok_with_message(
        format!("Restocked {} x {}", outcome.quantity, outcome.name),
        outcome,
    ))
}

/// `GET /api/stock/counter`: sellable products with live name and price.
pub async fn counter_products(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
) -> ApiResult<Response> {
    let products = state.db.stock().list_counter_products().await?;
    Ok(response::ok(products))
}
