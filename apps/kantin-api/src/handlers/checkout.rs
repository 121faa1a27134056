//! `POST /api/checkout`

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use kantin_core::checkout::{CheckoutLine, CheckoutRequest};
use kantin_core::{Capability, Money, PaymentMethod};

use crate::actor::CurrentActor;
use crate::error::ApiResult;
use crate::response;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutItemBody {
    /// Counter product id.
    pub product_id: String,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub items: Vec<CheckoutItemBody>,
    pub cash_given: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl From<CheckoutBody> for CheckoutRequest {
    fn from(body: CheckoutBody) -> Self {
        CheckoutRequest {
            lines: body
                .items
                .into_iter()
                .map(|item| CheckoutLine::new(item.product_id, item.qty))
                .collect(),
            cash_given: body.cash_given,
            payment_method: body.payment_method,
        }
    }
}

pub async fn checkout(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    payload: Result<Json<CheckoutBody>, JsonRejection>,
) -> ApiResult<Response> {
    let cashier = actor.require(Capability::Checkout)?;
    let Json(body) = payload?;

    let receipt = state
        .db
        .transactions()
        .checkout(cashier, &body.into())
        .await?;

    Ok(response::created("Checkout complete", receipt))
}
