//! # Domain Types
//!
//! Core domain types used throughout the canteen ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐  1:1  ┌──────────────────┐                       │
//! │  │ WarehouseProduct │◄──────│  CounterProduct  │                       │
//! │  │  ──────────────  │       │  ──────────────  │                       │
//! │  │  name, category  │       │  warehouse ref   │                       │
//! │  │  price, unit     │       │  counter stock   │                       │
//! │  │  warehouse stock │       └────────┬─────────┘                       │
//! │  └──────────────────┘                │ sold in                          │
//! │                                      ▼                                  │
//! │  ┌──────────────────┐  1:N  ┌──────────────────┐   ┌───────────────┐   │
//! │  │   Transaction    │──────►│ TransactionItem  │   │    Expense    │   │
//! │  │  invoice, total  │       │ qty, unit price  │   │ description   │   │
//! │  │  cash, change    │       │ (snapshot)       │   │ amount, date  │   │
//! │  └──────────────────┘       └──────────────────┘   └───────────────┘   │
//! │                                                                         │
//! │  Ledger = Transactions + TransactionItems + Expenses (append-only)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Roles & Actors
// =============================================================================

/// The role of an authenticated user. Closed set, never a free-text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Accepts `kasir` as an alias of `cashier`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "cashier" | "kasir" => Ok(Role::Cashier),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "cashier".to_string()],
            }),
        }
    }
}

/// An authenticated user, as supplied by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            username: username.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Stock Tier
// =============================================================================

/// Which stock counter an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockTier {
    /// Back-room inventory, not directly sellable.
    Warehouse,
    /// Front-of-house sellable inventory.
    Counter,
}

impl fmt::Display for StockTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockTier::Warehouse => f.write_str("warehouse"),
            StockTier::Counter => f.write_str("counter"),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Digital wallet.
    Digital,
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "digital" => Ok(PaymentMethod::Digital),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: vec![
                    "cash".to_string(),
                    "card".to_string(),
                    "digital".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Warehouse Product
// =============================================================================

/// A catalog entry with its back-room stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WarehouseProduct {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on reports.
    pub name: String,

    pub category: String,

    /// Current unit price. Line items snapshot this at checkout.
    pub price: Money,

    /// Warehouse stock level, never negative.
    pub stock: i64,

    /// Unit of measure (`pcs`, `box`, ...).
    pub unit: String,

    /// Whether the product is active.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a warehouse product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewWarehouseProduct {
    pub name: String,
    pub category: String,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    crate::DEFAULT_UNIT.to_string()
}

// =============================================================================
// Counter Product
// =============================================================================

/// The counter-facing stock record for one warehouse product.
///
/// Holds only its own stock. Name, price and unit live on the warehouse
/// product and are read through [`CounterProductView`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CounterProduct {
    pub id: String,
    pub warehouse_product_id: String,
    /// Counter stock level, never negative.
    pub stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A counter product joined with its warehouse product.
///
/// This is a computed view: `name`, `category`, `unit` and `price` always come
/// from the warehouse row at query time, so they cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CounterProductView {
    pub id: String,
    pub warehouse_product_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub price: Money,
    pub stock: i64,
}

impl CounterProductView {
    /// Checks if `quantity` can be sold from the counter.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Result of a warehouse-to-counter transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferOutcome {
    pub warehouse_product_id: String,
    pub counter_product_id: String,
    pub name: String,
    pub quantity: i64,
    pub warehouse_stock: i64,
    pub counter_stock: i64,
}

/// Result of a warehouse restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockOutcome {
    pub warehouse_product_id: String,
    pub name: String,
    pub quantity: i64,
    pub warehouse_stock: i64,
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable sale record.
///
/// ## Invariants
/// - `change == cash_given - total`
/// - `cash_given >= total`
/// - `total == Σ items.subtotal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    /// `INV-{year}-{seq:03}`, unique.
    pub invoice: String,
    pub cashier_id: String,
    pub cashier_username: String,
    pub total: Money,
    pub cash_given: Money,
    pub change: Money,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An immutable line item. Uses snapshot pattern to freeze the unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub counter_product_id: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// `unit_price × quantity`.
    pub subtotal: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item together with the product name read through the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemDetail {
    pub counter_product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// A committed transaction with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub transaction: Transaction,
    pub items: Vec<ItemDetail>,
}

impl Receipt {
    /// Σ item subtotals. Equals `transaction.total` for every committed receipt.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(|i| i.subtotal).sum()
    }
}

// =============================================================================
// Expense
// =============================================================================

/// An immutable outlay record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub cashier_id: String,
    pub cashier_username: String,
    pub description: String,
    pub amount: Money,
    /// Business date, defaults to the creation date.
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
