//! Collaborator clients
//!
//! The ordering core consumes the payment provider and the notification
//! dispatcher as opaque contracts; both are traits with HTTP-backed
//! production implementations and trivially injectable test doubles.

pub mod notify;
pub mod payment;

pub use notify::{NotificationDispatcher, OrderNotification};
pub use payment::{PaymentGateway, RefundRequest, RefundResult};
