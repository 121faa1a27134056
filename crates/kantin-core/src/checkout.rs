//! # Checkout Planning
//!
//! Pure validation and arithmetic for a checkout. Nothing here writes; the
//! database layer takes a [`CheckoutPlan`] and applies it as one unit of work.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest { lines: [(counter_product_id, qty)], cash_given }    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. look up every counter product ──────────► NotFound                 │
//! │  2. counter stock ≥ qty (summed per product) ► InsufficientStock       │
//! │  3. subtotal = current price × qty (price snapshot)                    │
//! │  4. total = Σ subtotal, cash_given ≥ total ──► InsufficientPayment     │
//! │  5. change = cash_given − total                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutPlan ──► kantin-db: invoice + items + stock decrement (atomic) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CounterProductView, PaymentMethod, StockTier};
use crate::validation::{validate_amount, validate_line_count, validate_quantity, ValidationResult};

// =============================================================================
// Request
// =============================================================================

/// One requested line: a counter product and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutLine {
    pub counter_product_id: String,
    pub quantity: i64,
}

impl CheckoutLine {
    pub fn new(counter_product_id: impl Into<String>, quantity: i64) -> Self {
        CheckoutLine {
            counter_product_id: counter_product_id.into(),
            quantity,
        }
    }
}

/// An ordered list of lines plus the tendered cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub lines: Vec<CheckoutLine>,
    pub cash_given: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
    pub fn new(lines: Vec<CheckoutLine>, cash_given: Money) -> Self {
        CheckoutRequest {
            lines,
            cash_given,
            payment_method: PaymentMethod::Cash,
        }
    }

    /// Field-level checks that need no product data.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_line_count(self.lines.len())?;

        for line in &self.lines {
            if line.counter_product_id.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "product_id".to_string(),
                });
            }
            validate_quantity(line.quantity)?;
        }

        validate_amount("cash_given", self.cash_given)
    }

    /// Distinct product ids in first-seen order.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.counter_product_id) {
                ids.push(line.counter_product_id.clone());
            }
        }
        ids
    }
}

// =============================================================================
// Plan
// =============================================================================

/// A validated line with its price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlannedLine {
    pub counter_product_id: String,
    pub name: String,
    pub quantity: i64,
    /// Price at the moment of checkout, decoupled from later price changes.
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Everything the mutating step needs, already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutPlan {
    pub lines: Vec<PlannedLine>,
    pub total: Money,
    pub cash_given: Money,
    pub change: Money,
    pub payment_method: PaymentMethod,
}

impl CheckoutPlan {
    /// Builds a plan from a request and the counter products it references.
    ///
    /// `catalog` maps counter product id to its current view. Lines are
    /// checked in request order and the first violation is returned.
    ///
    /// ## Errors
    /// - `Validation` for malformed requests
    /// - `NotFound` when a line references an unknown counter product
    /// - `InsufficientStock` when the summed demand for a product exceeds its
    ///   counter stock
    /// - `InsufficientPayment` when `cash_given < total`
    pub fn build(
        request: &CheckoutRequest,
        catalog: &HashMap<String, CounterProductView>,
    ) -> CoreResult<Self> {
        request.validate()?;

        let mut demand: HashMap<&str, i64> = HashMap::new();
        let mut lines = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            let product = catalog
                .get(&line.counter_product_id)
                .ok_or_else(|| CoreError::not_found("Counter product", &line.counter_product_id))?;

            let requested = demand.entry(line.counter_product_id.as_str()).or_insert(0);
            *requested += line.quantity;

            if !product.can_sell(*requested) {
                return Err(CoreError::InsufficientStock {
                    tier: StockTier::Counter,
                    product: product.name.clone(),
                    available: product.stock,
                    requested: *requested,
                });
            }

            let subtotal = product
                .price
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(|| amount_overflow("subtotal"))?;

            lines.push(PlannedLine {
                counter_product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
                subtotal,
            });
        }

        let total = lines
            .iter()
            .try_fold(Money::zero(), |acc, l| acc.checked_add(l.subtotal))
            .ok_or_else(|| amount_overflow("total"))?;

        if request.cash_given < total {
            return Err(CoreError::InsufficientPayment {
                total,
                cash_given: request.cash_given,
            });
        }

        Ok(CheckoutPlan {
            lines,
            total,
            cash_given: request.cash_given,
            change: request.cash_given - total,
            payment_method: request.payment_method,
        })
    }

    /// Quantity to take from each counter product, summed, in first-seen order.
    pub fn stock_demand(&self) -> Vec<(String, i64)> {
        let mut demand: Vec<(String, i64)> = Vec::new();
        for line in &self.lines {
            match demand.iter_mut().find(|(id, _)| *id == line.counter_product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => demand.push((line.counter_product_id.clone(), line.quantity)),
            }
        }
        demand
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

fn amount_overflow(field: &str) -> CoreError {
    CoreError::Validation(ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
