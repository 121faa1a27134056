//! Expense recording and listing.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use kantin_core::{Capability, Money};

use crate::actor::CurrentActor;
use crate::error::ApiResult;
use crate::response;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpenseBody {
    pub description: String,
    pub amount: Money,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    pub date: Option<NaiveDate>,
}

/// `POST /api/expenses`
pub async fn record(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    payload: Result<Json<ExpenseBody>, JsonRejection>,
) -> ApiResult<Response> {
    let cashier = actor.require(Capability::RecordExpense)?;
    let Json(body) = payload?;

    let expense = state
        .db
        .expenses()
        .record(cashier, &body.description, body.amount)
        .await?;

    Ok(response::created("Expense recorded", expense))
}

/// `GET /api/expenses?date=YYYY-MM-DD`
pub async fn list(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> ApiResult<Response> {
    actor.require(Capability::ListExpenses)?;
    let Query(query) = query?;

    let expenses = state.db.expenses().list(query.date).await?;
    Ok(response::ok(expenses))
}
