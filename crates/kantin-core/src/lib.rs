//! # kantin-core: Pure Business Logic for the Kantin Ledger
//!
//! This crate is the **heart** of the canteen backend. It contains the
//! checkout math, invoice numbering, role checks and reporting policies as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kantin Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kantin-api (HTTP)                            │   │
//! │  │    transfer, restock, checkout, expenses, reports, insights     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kantin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │  types   │ │ checkout │ │ invoice  │ │  report  │         │   │
//! │  │   │ Products │ │   Plan   │ │ INV-Y-N  │ │ policies │         │   │
//! │  │   │  Ledger  │ │  Change  │ │          │ │  DTOs    │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kantin-db (Database Layer)                   │   │
//! │  │        SQLite ledger, units of work, invoice sequence           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (products, transactions, expenses, actors)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`capability`] - Role based capability checks
//! - [`checkout`] - Checkout validation and totals
//! - [`invoice`] - Invoice number format
//! - [`report`] - Reporting DTOs, restock and stockout policies
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kantin_core::money::Money;
//! use kantin_core::invoice::InvoiceNumber;
//!
//! let price = Money::from_major(1_000);
//! let total = price.multiply_quantity(5);
//! assert_eq!(total, Money::from_major(5_000));
//!
//! let invoice = InvoiceNumber::new(2026, 1);
//! assert_eq!(invoice.to_string(), "INV-2026-001");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capability;
pub mod checkout;
pub mod error;
pub mod invoice;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use capability::{has_capability, Capability};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single checkout.
///
/// Keeps each checkout a short, bounded unit of work.
pub const MAX_CHECKOUT_LINES: usize = 100;

/// Unit of measure given to warehouse products when none is supplied.
pub const DEFAULT_UNIT: &str = "pcs";
