//! Delivery address model

use serde::{Deserialize, Serialize};

/// Owned by exactly one customer; an order's delivery address must belong
/// to the ordering customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryAddress {
    pub id: i64,
    pub customer_id: i64,
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
