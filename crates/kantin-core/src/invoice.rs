//! # Invoice Numbers
//!
//! Invoices read `INV-{year}-{seq:03}`: `INV-2026-001`, `INV-2026-002`, ...
//! The sequence is scoped to the calendar year of the transaction and starts
//! at 1 every year. Allocation lives in the database layer (a per-year counter
//! incremented inside the checkout unit of work); this module only formats
//! and parses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Literal prefix of every invoice.
pub const INVOICE_PREFIX: &str = "INV";

/// A parsed invoice identifier.
///
/// Ordering is by year, then sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber {
    year: i32,
    seq: u32,
}

impl InvoiceNumber {
    /// Creates an invoice number. `seq` starts at 1.
    pub const fn new(year: i32, seq: u32) -> Self {
        InvoiceNumber { year, seq }
    }

    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub const fn seq(&self) -> u32 {
        self.seq
    }
}

/// Sequences below 1000 are zero padded to three digits; larger ones print in full.
impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:03}", INVOICE_PREFIX, self.year, self.seq)
    }
}

impl FromStr for InvoiceNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "invoice".to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.trim().splitn(3, '-');
        let (prefix, year, seq) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(y), Some(n)) => (p, y, n),
            _ => return Err(invalid("expected INV-YYYY-NNN")),
        };

        if prefix != INVOICE_PREFIX {
            return Err(invalid("missing INV prefix"));
        }
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("year must be four digits"));
        }
        if seq.len() < 3 || !seq.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("sequence must be at least three digits"));
        }

        let year: i32 = year.parse().map_err(|_| invalid("year out of range"))?;
        let seq: u32 = seq.parse().map_err(|_| invalid("sequence out of range"))?;
        if seq == 0 {
            return Err(invalid("sequence starts at 1"));
        }

        Ok(InvoiceNumber { year, seq })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(InvoiceNumber::new(2026, 1).to_string(), "INV-2026-001");
        assert_eq!(InvoiceNumber::new(2026, 42).to_string(), "INV-2026-042");
        assert_eq!(InvoiceNumber::new(2026, 1234).to_string(), "INV-2026-1234");
    }

    #[test]
    fn test_parse() {
        let inv: InvoiceNumber = "INV-2025-017".parse().unwrap();
        assert_eq!(inv.year(), 2025);
        assert_eq!(inv.seq(), 17);

        let wide: InvoiceNumber = "INV-2025-1001".parse().unwrap();
        assert_eq!(wide.seq(), 1001);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("INV-2025".parse::<InvoiceNumber>().is_err());
        assert!("ABC-2025-001".parse::<InvoiceNumber>().is_err());
        assert!("INV-25-001".parse::<InvoiceNumber>().is_err());
        assert!("INV-2025-01".parse::<InvoiceNumber>().is_err());
        assert!("INV-2025-000".parse::<InvoiceNumber>().is_err());
        assert!("INV-2025-0x1".parse::<InvoiceNumber>().is_err());
    }

    #[test]
    fn test_ordering_within_and_across_years() {
        let a = InvoiceNumber::new(2025, 999);
        let b = InvoiceNumber::new(2026, 1);
        let c = InvoiceNumber::new(2026, 2);
        assert!(a < b && b < c);
    }
}
