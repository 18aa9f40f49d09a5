//! Promo engine

pub mod engine;

pub use engine::{PromoOutcome, PromoRejection, ValidPromo, apply, discount_amount};
