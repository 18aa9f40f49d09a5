//! Cart API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::SelectionSet;
use shared::models::serde_helpers;
use validator::Validate;

use crate::cart::{self, validate::validate_selection};
use crate::core::ServerState;
use crate::db::repository::{cart as cart_repo, menu as menu_repo};
use crate::pricing::to_f64;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize, Validate)]
pub struct AddLineRequest {
    pub customer_id: i64,
    pub menu_item_id: i64,
    #[validate(range(min = 1, max = 99, message = "quantity must be between 1 and 99"))]
    pub quantity: i64,
    #[validate(length(max = 500, message = "note is too long"))]
    pub note: Option<String>,
    #[serde(default)]
    pub selection: SelectionSet,
}

#[derive(Debug, Serialize)]
pub struct AddLineResponse {
    pub cart_id: i64,
    pub line_id: i64,
    /// True when the quantity was folded into an existing line with the
    /// same configuration.
    pub merged: bool,
}

/// Add a configured item to the cart, merging by selection signature.
pub async fn add_line(
    State(state): State<ServerState>,
    Json(payload): Json<AddLineRequest>,
) -> AppResult<Json<AppResponse<AddLineResponse>>> {
    payload.validate()?;

    let item = menu_repo::find_item(&state.db, payload.menu_item_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Menu item {} not found", payload.menu_item_id))
        })?;

    validate_selection(&state.db, item.id, &payload.selection).await?;

    let cart = cart_repo::get_or_create(&state.db, payload.customer_id).await?;
    let outcome = cart::merge_line(
        &state.db,
        cart.id,
        item.id,
        item.restaurant_id,
        payload.quantity,
        payload.note.as_deref(),
        &payload.selection,
    )
    .await?;

    Ok(ok(AddLineResponse {
        cart_id: cart.id,
        line_id: outcome.line_id,
        merged: outcome.merged,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub customer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CartViewLine {
    pub line_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub selection: SelectionSet,
    #[serde(with = "serde_helpers::money")]
    pub unit_price: f64,
    #[serde(with = "serde_helpers::money")]
    pub line_total: f64,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart_id: Option<i64>,
    pub restaurant_id: Option<i64>,
    pub lines: Vec<CartViewLine>,
    #[serde(with = "serde_helpers::money")]
    pub subtotal: f64,
}

/// Priced view of the customer's cart; an empty cart is an empty view, not
/// an error (checkout is where emptiness fails).
pub async fn view(
    State(state): State<ServerState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<AppResponse<CartView>>> {
    let Some(cart) = cart_repo::find_by_customer(&state.db, query.customer_id).await? else {
        return Ok(ok(CartView { cart_id: None, restaurant_id: None, lines: vec![], subtotal: 0.0 }));
    };
    let raw_lines = cart_repo::list_lines(&state.db, cart.id).await?;
    if raw_lines.is_empty() {
        return Ok(ok(CartView {
            cart_id: Some(cart.id),
            restaurant_id: None,
            lines: vec![],
            subtotal: 0.0,
        }));
    }

    let totals = cart::aggregate(&state.db, query.customer_id).await?;
    let lines = totals
        .lines
        .iter()
        .map(|priced| {
            let selection = priced.line.selection_set().unwrap_or_default();
            CartViewLine {
                line_id: priced.line.id,
                menu_item_id: priced.line.menu_item_id,
                item_name: priced.line.item_name.clone(),
                quantity: priced.line.quantity,
                note: priced.line.note.clone(),
                selection,
                unit_price: to_f64(priced.unit_price),
                line_total: to_f64(priced.line_total),
            }
        })
        .collect();

    Ok(ok(CartView {
        cart_id: Some(totals.cart_id),
        restaurant_id: Some(totals.restaurant_id),
        lines,
        subtotal: to_f64(totals.subtotal),
    }))
}
