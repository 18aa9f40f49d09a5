//! Menu catalog models
//!
//! Read-only from the ordering core's point of view: catalog editing lives
//! in the back-office service.

use super::serde_helpers;
use serde::{Deserialize, Serialize};

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub category_id: i64,
    pub name: String,
    #[serde(with = "serde_helpers::money")]
    pub base_price: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// How many options a variation group accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SelectionMode {
    /// Exactly one option (e.g. size)
    Single,
    /// One or more options
    Multiple,
}

/// Variation group on a menu item (e.g. Size)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductVariation {
    pub id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub selection_mode: SelectionMode,
}

/// Option inside a variation group, carrying a non-negative price modifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VariationOption {
    pub id: i64,
    pub variation_id: i64,
    pub name: String,
    #[serde(with = "serde_helpers::money")]
    pub price_modifier: f64,
    pub is_active: bool,
}

/// Add-on group on a menu item (e.g. Toppings)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AddOnGroup {
    pub id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub is_required: bool,
    /// Max selectable options (NULL = unlimited)
    pub max_selections: Option<i64>,
}

/// Independently priced option inside an add-on group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AddOnOption {
    pub id: i64,
    pub add_on_id: i64,
    pub name: String,
    #[serde(with = "serde_helpers::money")]
    pub price: f64,
    pub is_active: bool,
}

/// Batch price-lookup row: one priced option joined back to the menu item
/// it belongs to, so a selection can be checked against the right item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OptionPrice {
    pub id: i64,
    pub menu_item_id: i64,
    pub price: f64,
}
