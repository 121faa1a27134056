//! # Repository Module
//!
//! Database repository implementations for the kantin ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Units of Work                 │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.transactions().checkout(&actor, &request)                  │
//! │       ▼                                                                 │
//! │  TransactionRepository ──────┐                                         │
//! │  ├── checkout                │ one SQLite transaction:                 │
//! │  ├── history                 │   invoice::allocate                     │
//! │  └── get_by_invoice          │   stock::decrement_counter_stock × N    │
//! │                              │   INSERT transactions / items           │
//! │  StockLedger                 │   COMMIT                                │
//! │  ├── transfer_to_counter ────┘ (own transaction)                       │
//! │  └── restock_warehouse                                                 │
//! │                                                                         │
//! │  ExpenseRepository     ReportRepository (read-only, committed state)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`stock::StockLedger`] - Catalog, transfers, restocks
//! - [`transaction::TransactionRepository`] - Checkout and history
//! - [`invoice::InvoiceRepository`] - Per-year invoice sequence
//! - [`expense::ExpenseRepository`] - Expense records
//! - [`report::ReportRepository`] - Reports and insights

pub mod expense;
pub mod invoice;
pub mod report;
pub mod stock;
pub mod transaction;

use std::future::Future;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::error::DbResult;

/// Attempts per mutating unit of work before a lock conflict is surfaced.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Runs `unit` again when it fails with a transient lock error.
///
/// `unit` must be a complete unit of work: a failed attempt has rolled back,
/// so re-running it from the top is safe.
pub(crate) async fn with_retry<T, F, Fut>(operation: &'static str, mut unit: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt = 1;
    loop {
        match unit().await {
            Err(err) if err.is_transient() && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(operation, attempt, error = %err, "Write conflict, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Generates a new row ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
