//! Reorder engine
//!
//! Reconstructs cart lines from a finished order. Each frozen selection set
//! is canonicalized and merged into the live cart through the same
//! signature primitive as add-to-cart, so reordering twice compounds
//! quantities instead of duplicating lines.

use shared::models::OrderStatus;

use crate::cart;
use crate::core::ServerState;
use crate::db::repository::{cart as cart_repo, order as order_repo};
use crate::orders::actor::Actor;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    pub cart_id: i64,
    pub items_added: usize,
}

pub async fn reorder(
    state: &ServerState,
    order_id: i64,
    customer_id: i64,
) -> AppResult<ReorderOutcome> {
    let order = order_repo::require(&state.db, order_id).await?;
    Actor::Customer(customer_id).ensure_owns(&order)?;

    if !matches!(order.status, OrderStatus::Delivered | OrderStatus::Cancelled) {
        return Err(AppError::state_conflict(format!(
            "only delivered or cancelled orders can be reordered (current status {})",
            order.status
        )));
    }

    let lines = order_repo::list_lines(&state.db, order_id).await?;
    let cart = cart_repo::get_or_create(&state.db, customer_id).await?;

    let mut items_added = 0;
    for line in &lines {
        let selection = line
            .selection_set()
            .map_err(|e| AppError::internal(format!("stored selection data is invalid: {e}")))?;
        cart::merge_line(
            &state.db,
            cart.id,
            line.menu_item_id,
            order.restaurant_id,
            line.quantity,
            line.note.as_deref(),
            &selection,
        )
        .await?;
        items_added += 1;
    }

    tracing::info!(order_id, customer_id, cart_id = cart.id, items_added, "Order reordered into cart");
    Ok(ReorderOutcome { cart_id: cart.id, items_added })
}
