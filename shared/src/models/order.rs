//! Order models
//!
//! Orders are append-only: identity and pricing fields are frozen at
//! creation time and never recomputed; only `status`, `payment_status` and
//! the annotation columns change afterwards.

use super::serde_helpers;
use crate::selection::SelectionSet;
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Linear path: PENDING -> ACCEPTED -> PREPARING -> READY ->
/// OUT_FOR_DELIVERY -> DELIVERED, with CANCELLED and REJECTED as terminal
/// side branches off PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Position on the linear delivery path; side branches have none.
    pub fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Accepted => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::OutForDelivery => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled | OrderStatus::Rejected => None,
        }
    }

    /// No transitions are accepted out of a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state, tracked independently of the delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Card,
    Cash,
}

/// Order entity.
///
/// Pricing invariant, enforced at creation and never recomputed:
/// `total == subtotal + tax + delivery_fee - discount` (2 dp),
/// `discount <= subtotal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub delivery_address_id: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(with = "serde_helpers::money")]
    pub subtotal: f64,
    #[serde(with = "serde_helpers::money")]
    pub tax: f64,
    #[serde(with = "serde_helpers::money")]
    pub delivery_fee: f64,
    #[serde(with = "serde_helpers::money")]
    pub discount: f64,
    #[serde(with = "serde_helpers::money")]
    pub total: f64,
    pub promo_code_id: Option<i64>,
    /// Payment-provider transaction reference, present once a card payment
    /// has been captured.
    pub payment_ref: Option<String>,
    pub special_instructions: Option<String>,
    pub decline_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub idempotency_key: Option<String>,
    pub actual_delivery_time: Option<i64>,
    pub placed_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Frozen copy of a cart line at order-creation time. Catalog price changes
/// never alter historical order cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    /// Per-unit price, already inclusive of variation/add-on modifiers.
    #[serde(with = "serde_helpers::money")]
    pub unit_price: f64,
    pub quantity: i64,
    #[serde(with = "serde_helpers::money")]
    pub line_total: f64,
    pub selections: String,
    pub note: Option<String>,
}

impl OrderLine {
    pub fn selection_set(&self) -> serde_json::Result<SelectionSet> {
        SelectionSet::from_json(&self.selections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"OUT_FOR_DELIVERY\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn terminal_statuses_have_no_successor() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled, OrderStatus::Rejected] {
            assert!(status.is_terminal());
        }
        assert!(!OrderStatus::OutForDelivery.is_terminal());
    }

    #[test]
    fn ranks_follow_the_delivery_path() {
        assert!(OrderStatus::Pending.rank() < OrderStatus::Accepted.rank());
        assert!(OrderStatus::Accepted.rank() < OrderStatus::Delivered.rank());
        assert_eq!(OrderStatus::Cancelled.rank(), None);
    }
}
