//! # Error Types
//!
//! Domain-specific error types for kantin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kantin-core errors (this file)                                        │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kantin-db errors (separate crate)                                     │
//! │  └── DbError          - Persistence failures, concurrency conflicts    │
//! │                                                                         │
//! │  kantin-api errors (app)                                               │
//! │  └── ApiError         - {status: false, error} + HTTP status           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;
use crate::types::StockTier;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// Every variant is raised before any write becomes visible, so callers can
/// surface them directly without worrying about partial state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced product or transaction does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Requested quantity exceeds the stock available at a tier.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (Teh Botol x5)
    ///      │
    ///      ▼
    /// Check counter stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { tier: Counter, product: "Teh Botol", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Client shows: "Insufficient counter stock for Teh Botol"
    /// ```
    #[error("Insufficient {tier} stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        tier: StockTier,
        product: String,
        available: i64,
        requested: i64,
    },

    /// Tendered cash is below the computed total.
    #[error("Payment amount {cash_given} is less than the total {total}")]
    InsufficientPayment { total: Money, cash_given: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field so the boundary can report
/// field-level problems.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            tier: StockTier::Counter,
            product: "Teh Botol".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient counter stock for Teh Botol: available 3, requested 5"
        );
    }

    #[test]
    fn test_insufficient_payment_message() {
        let err = CoreError::InsufficientPayment {
            total: Money::from_major(5_000),
            cash_given: Money::from_major(2_000),
        };
        assert_eq!(
            err.to_string(),
            "Payment amount Rp2000.00 is less than the total Rp5000.00"
        );
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.field(), "quantity");
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
