//! Pricing
//!
//! Decimal money helpers and the batched catalog price resolver.

pub mod money;
pub mod resolver;

pub use money::{round_money, to_decimal, to_f64};
pub use resolver::{PriceCatalog, PricingError};
