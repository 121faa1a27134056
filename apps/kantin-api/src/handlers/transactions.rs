//! Transaction history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;

use kantin_core::{Capability, CoreError};

use crate::actor::CurrentActor;
use crate::error::ApiResult;
use crate::response;
use crate::AppState;

/// `GET /api/transactions`: all transactions for admins, own ones for cashiers.
pub async fn history(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
) -> ApiResult<Response> {
    let viewer = actor.require(Capability::ViewHistory)?;
    let receipts = state.db.transactions().history(viewer).await?;
    Ok(response::ok(receipts))
}

/// `GET /api/transactions/:invoice`
///
/// A cashier asking for someone else's invoice gets the same 404 as for an
/// unknown one.
pub async fn by_invoice(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    Path(invoice): Path<String>,
) -> ApiResult<Response> {
    let viewer = actor.require(Capability::ViewHistory)?;

    let receipt = state
        .db
        .transactions()
        .get_by_invoice(&invoice)
        .await?
        .filter(|r| viewer.is_admin() || r.transaction.cashier_id == viewer.id)
        .ok_or_else(|| CoreError::not_found("Transaction", invoice.as_str()))?;

    Ok(response::ok(receipt))
}
