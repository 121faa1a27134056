//! HTTP handlers, one module per resource.
//!
//! Every handler follows the same shape: extract the [`CurrentActor`],
//! check the capability, call into `kantin-db`, wrap the result in the
//! success envelope. Errors flow out through [`ApiError`].
//!
//! [`CurrentActor`]: crate::actor::CurrentActor
//! [`ApiError`]: crate::error::ApiError

pub mod checkout;
pub mod expenses;
pub mod health;
pub mod insights;
pub mod reports;
pub mod stock;
pub mod transactions;
