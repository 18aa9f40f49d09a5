//! Checkout: order factory and order-number generation

pub mod order_factory;
pub mod order_number;

pub use order_factory::{CheckoutRequest, PlacedOrder, create_order};
