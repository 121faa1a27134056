//! # kantin-db: Database Layer for the Kantin Ledger
//!
//! This crate provides database access for the canteen backend.
//! It uses SQLite for storage with sqlx for async operations, and owns every
//! unit of work that changes stock or the ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kantin Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /api/checkout)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kantin-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ StockLedger    │   │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ Transactions   │   │ 002_inv.sql  │  │   │
//! │  │   │ WAL + busy    │    │ Invoices       │   │              │  │   │
//! │  │   │ timeout       │    │ Expenses       │   │              │  │   │
//! │  │   │               │    │ Reports        │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (kantin.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Stock ledger, checkout, invoices, expenses, reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kantin_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./kantin.db")).await?;
//!
//! let moved = db.stock().transfer_to_counter(&warehouse_id, 30).await?;
//! let receipt = db.transactions().checkout(&actor, &request).await?;
//! let today = db.reports().daily(receipt.transaction.created_at.date_naive()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::report::ReportRepository;
pub use repository::stock::StockLedger;
pub use repository::transaction::TransactionRepository;
