//! # Validation Module
//!
//! Input validation for ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (kantin-api)                                   │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── THIS MODULE: field rules (positive quantities, lengths)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout planning (kantin-core::checkout)                    │
//! │  └── Stock sufficiency, payment sufficiency (before any write)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  ├── UNIQUE (invoice), UNIQUE (warehouse_product_id)                   │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_CHECKOUT_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name (1-255 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 255)
}

/// Validates a product category (1-100 characters).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_text("category", category, 100)
}

/// Validates a unit of measure (1-50 characters).
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    validate_text("unit", unit, 50)
}

/// Validates an expense description (1-255 characters).
///
/// ## Example
/// ```rust
/// use kantin_core::validation::validate_description;
///
/// assert!(validate_description("Beli gas LPG").is_ok());
/// assert!(validate_description("   ").is_err());
/// ```
pub fn validate_description(description: &str) -> ValidationResult<()> {
    validate_text("description", description, 255)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock or line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Transfers, restocks and checkout lines all require at least one unit.
/// There is no upper bound; stock sufficiency is checked by the ledger.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (cash tendered, expense).
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an initial stock level (>= 0).
pub fn validate_initial_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a calendar month (1-12).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of checkout lines.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CHECKOUT_LINES (100)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_CHECKOUT_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CHECKOUT_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_fields() {
        assert!(validate_product_name("Nasi Goreng").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(256)).is_err());
        assert!(validate_category(&"B".repeat(101)).is_err());
        assert!(validate_unit("pcs").is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_money() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_minor(-1)).is_err());
        assert!(validate_amount("cash_given", Money::from_major(1)).is_ok());
        let err = validate_amount("amount", Money::zero()).unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(MAX_CHECKOUT_LINES).is_ok());
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(MAX_CHECKOUT_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }
}
