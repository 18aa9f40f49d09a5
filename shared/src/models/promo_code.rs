//! Promo code model

use serde::{Deserialize, Serialize};

/// Time-bounded percentage discount, optionally scoped to one restaurant.
///
/// Codes are stored uppercase; lookups normalize the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PromoCode {
    pub id: i64,
    pub code: String,
    /// 0..=100
    pub discount_percentage: f64,
    /// Validity window, epoch millis, starts_at <= ends_at
    pub starts_at: i64,
    pub ends_at: i64,
    /// When set, the code only applies to this restaurant's orders.
    pub restaurant_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}
