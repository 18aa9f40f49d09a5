//! Cart models

use crate::selection::SelectionSet;
use serde::{Deserialize, Serialize};

/// One cart per customer; cleared on successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: i64,
    pub customer_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One orderable configuration of a menu item held before checkout.
///
/// `selections` is the JSON encoding of a [`SelectionSet`];
/// `selection_signature` is its precomputed canonical signature, used for
/// configuration-equality merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub cart_id: i64,
    pub menu_item_id: i64,
    pub restaurant_id: i64,
    pub quantity: i64,
    pub note: Option<String>,
    pub selections: String,
    pub selection_signature: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CartLine {
    pub fn selection_set(&self) -> serde_json::Result<SelectionSet> {
        SelectionSet::from_json(&self.selections)
    }
}

/// Cart line joined with the catalog data needed to price it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLineDetail {
    pub id: i64,
    pub cart_id: i64,
    pub menu_item_id: i64,
    pub restaurant_id: i64,
    pub item_name: String,
    pub base_price: f64,
    pub quantity: i64,
    pub note: Option<String>,
    pub selections: String,
    pub selection_signature: String,
}

impl CartLineDetail {
    pub fn selection_set(&self) -> serde_json::Result<SelectionSet> {
        SelectionSet::from_json(&self.selections)
    }
}
