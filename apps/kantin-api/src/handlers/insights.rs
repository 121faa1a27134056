//! Sales insight, restock suggestions and stockout predictions.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use chrono::Utc;

use kantin_core::Capability;

use crate::actor::CurrentActor;
use crate::error::ApiResult;
use crate::response;
use crate::AppState;

/// `GET /api/insights/sales`: best sellers first.
pub async fn sales(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
) -> ApiResult<Response> {
    actor.require(Capability::ViewReports)?;
    let insight = state.db.reports().sales_insight().await?;
    Ok(response::ok(insight))
}

/// `GET /api/insights/restock`
pub async fn restock(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
) -> ApiResult<Response> {
    actor.require(Capability::ViewReports)?;
    let suggestions = state.db.reports().restock_suggestions().await?;
    Ok(response::ok(suggestions))
}

/// `GET /api/insights/stockout`: seven-day sales velocity per counter product.
pub async fn stockout(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
) -> ApiResult<Response> {
    actor.require(Capability::ViewReports)?;
    let predictions = state
        .db
        .reports()
        .stockout_predictions(Utc::now().date_naive())
        .await?;
    Ok(response::ok(predictions))
}
