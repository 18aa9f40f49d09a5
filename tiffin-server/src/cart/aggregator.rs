//! Cart aggregator
//!
//! Loads a customer's cart with joined catalog data, enforces the
//! single-restaurant invariant and computes the subtotal through the batch
//! price resolver. Used read-only by the checkout summary and as the first
//! step of order creation.

use rust_decimal::Decimal;
use shared::models::CartLineDetail;
use sqlx::SqlitePool;

use crate::db::repository::cart as cart_repo;
use crate::pricing::{PriceCatalog, round_money};
use crate::utils::{AppError, AppResult};

/// A cart line with its resolved per-unit price and line total.
/// Both stay unrounded; rounding happens once at the subtotal.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub line: CartLineDetail,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone)]
pub struct CartTotals {
    pub cart_id: i64,
    pub restaurant_id: i64,
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
}

/// Price the customer's whole cart.
///
/// Fails with a validation error on an empty (or missing) cart and with a
/// state conflict when lines span more than one restaurant — a checkout
/// can never partially succeed across restaurants.
pub async fn aggregate(pool: &SqlitePool, customer_id: i64) -> AppResult<CartTotals> {
    let cart = cart_repo::find_by_customer(pool, customer_id)
        .await?
        .ok_or_else(|| AppError::validation("cart is empty"))?;

    let lines = cart_repo::list_lines(pool, cart.id).await?;
    if lines.is_empty() {
        return Err(AppError::validation("cart is empty"));
    }

    let restaurant_id = lines[0].restaurant_id;
    if lines.iter().any(|l| l.restaurant_id != restaurant_id) {
        return Err(AppError::state_conflict(
            "cart contains items from more than one restaurant",
        ));
    }

    let catalog = PriceCatalog::load(pool, &lines).await?;

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = Decimal::ZERO;
    for line in lines {
        let selection = line
            .selection_set()
            .map_err(|e| AppError::validation(format!("invalid selection data: {e}")))?;
        let unit_price = catalog.unit_price(line.menu_item_id, line.base_price, &selection)?;
        let line_total = unit_price * Decimal::from(line.quantity);
        subtotal += line_total;
        priced.push(PricedLine { line, unit_price, line_total });
    }

    Ok(CartTotals {
        cart_id: cart.id,
        restaurant_id,
        lines: priced,
        subtotal: round_money(subtotal),
    })
}
