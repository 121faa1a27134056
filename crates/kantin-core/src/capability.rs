//! Role based capability checks.
//!
//! The ledger itself never looks at roles. The boundary calls
//! [`has_capability`] before invoking an operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Actor, Role};

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Checkout,
    TransferStock,
    RestockWarehouse,
    RecordExpense,
    ViewHistory,
    ListExpenses,
    ViewReports,
}

impl Capability {
    /// Roles allowed to exercise this capability.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Capability::Checkout
            | Capability::TransferStock
            | Capability::RestockWarehouse
            | Capability::RecordExpense
            | Capability::ViewHistory => &[Role::Admin, Role::Cashier],
            Capability::ListExpenses | Capability::ViewReports => &[Role::Admin],
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Checkout => "checkout",
            Capability::TransferStock => "transfer stock",
            Capability::RestockWarehouse => "restock warehouse",
            Capability::RecordExpense => "record expense",
            Capability::ViewHistory => "view history",
            Capability::ListExpenses => "list expenses",
            Capability::ViewReports => "view reports",
        };
        f.write_str(name)
    }
}

/// Returns true when `actor`'s role may exercise `capability`.
pub fn has_capability(actor: &Actor, capability: Capability) -> bool {
    capability.allowed_roles().contains(&actor.role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cashier_capabilities() {
        let cashier = Actor::new("u1", "budi", Role::Cashier);
        assert!(has_capability(&cashier, Capability::Checkout));
        assert!(has_capability(&cashier, Capability::TransferStock));
        assert!(has_capability(&cashier, Capability::RecordExpense));
        assert!(!has_capability(&cashier, Capability::ViewReports));
        assert!(!has_capability(&cashier, Capability::ListExpenses));
    }

    #[test]
    fn test_admin_has_every_capability() {
        let admin = Actor::new("u0", "siti", Role::Admin);
        for cap in [
            Capability::Checkout,
            Capability::TransferStock,
            Capability::RestockWarehouse,
            Capability::RecordExpense,
            Capability::ViewHistory,
            Capability::ListExpenses,
            Capability::ViewReports,
        ] {
            assert!(has_capability(&admin, cap), "admin should have {cap}");
        }
    }
}
