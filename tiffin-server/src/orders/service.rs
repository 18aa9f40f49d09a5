//! Order status services
//!
//! Orchestration around the pure state machine: load, capability check,
//! pure transition, conditional update (stale-state detection), reload,
//! notify. When the conditional update touches zero rows a concurrent
//! transition won the race; the current status is re-read and run through
//! the same pure rule so the caller gets the precise precondition that now
//! fails.

use shared::models::{Order, OrderLine, OrderStatus, PaymentStatus};
use sqlx::SqlitePool;

use crate::collab::notify::{NotificationEvent, OrderNotification, notify_detached};
use crate::core::ServerState;
use crate::db::repository::order as order_repo;
use crate::orders::actor::Actor;
use crate::orders::state_machine;
use crate::utils::validation::validate_reason;
use crate::utils::{AppError, AppResult};

/// Read an order with its lines on behalf of its customer.
pub async fn get_order_for_customer(
    pool: &SqlitePool,
    order_id: i64,
    customer_id: i64,
) -> AppResult<(Order, Vec<OrderLine>)> {
    let order = order_repo::require(pool, order_id).await?;
    Actor::Customer(customer_id).ensure_owns(&order)?;
    let lines = order_repo::list_lines(pool, order_id).await?;
    Ok((order, lines))
}

pub async fn list_orders_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<Order>> {
    Ok(order_repo::list_by_customer(pool, customer_id, limit, offset).await?)
}

/// The conditional update lost a race: report the precondition that fails
/// against the freshly loaded status.
async fn stale_transition_error<F>(pool: &SqlitePool, order_id: i64, rule: F) -> AppError
where
    F: Fn(OrderStatus) -> Result<OrderStatus, state_machine::TransitionError>,
{
    match order_repo::require(pool, order_id).await {
        Ok(current) => match rule(current.status) {
            Err(e) => e.into(),
            Ok(_) => AppError::state_conflict("order changed concurrently, please retry"),
        },
        Err(e) => e.into(),
    }
}

pub async fn accept_order(
    state: &ServerState,
    order_id: i64,
    restaurant_id: i64,
) -> AppResult<Order> {
    let order = order_repo::require(&state.db, order_id).await?;
    Actor::Restaurant(restaurant_id).ensure_owns(&order)?;
    let target = state_machine::accept(order.status)?;

    let updated = order_repo::transition_status(&state.db, order_id, order.status, target).await?;
    if !updated {
        return Err(stale_transition_error(&state.db, order_id, state_machine::accept).await);
    }

    let order = order_repo::require(&state.db, order_id).await?;
    tracing::info!(order_id, restaurant_id, "Order accepted");
    notify_detached(
        state.notifier.clone(),
        OrderNotification::for_order(NotificationEvent::OrderStatusChanged, &order, None),
    );
    Ok(order)
}

pub async fn decline_order(
    state: &ServerState,
    order_id: i64,
    restaurant_id: i64,
    reason: &str,
) -> AppResult<Order> {
    validate_reason(reason)?;
    let order = order_repo::require(&state.db, order_id).await?;
    Actor::Restaurant(restaurant_id).ensure_owns(&order)?;
    state_machine::decline(order.status)?;

    let updated = order_repo::decline_with_reason(&state.db, order_id, reason.trim()).await?;
    if !updated {
        return Err(stale_transition_error(&state.db, order_id, state_machine::decline).await);
    }

    let order = order_repo::require(&state.db, order_id).await?;
    tracing::info!(order_id, restaurant_id, reason, "Order declined");
    notify_detached(
        state.notifier.clone(),
        OrderNotification::for_order(
            NotificationEvent::OrderStatusChanged,
            &order,
            Some(reason.trim().to_string()),
        ),
    );
    Ok(order)
}

/// Forward move along ACCEPTED -> ... -> DELIVERED; reaching DELIVERED also
/// stamps the actual delivery time.
pub async fn advance_status(
    state: &ServerState,
    order_id: i64,
    restaurant_id: i64,
    target: OrderStatus,
) -> AppResult<Order> {
    let order = order_repo::require(&state.db, order_id).await?;
    Actor::Restaurant(restaurant_id).ensure_owns(&order)?;
    let target = state_machine::advance(order.status, target)?;

    let updated = if target == OrderStatus::Delivered {
        order_repo::mark_delivered(&state.db, order_id, order.status).await?
    } else {
        order_repo::transition_status(&state.db, order_id, order.status, target).await?
    };
    if !updated {
        return Err(
            stale_transition_error(&state.db, order_id, |from| state_machine::advance(from, target))
                .await,
        );
    }

    let order = order_repo::require(&state.db, order_id).await?;
    tracing::info!(order_id, restaurant_id, status = %order.status, "Order status advanced");
    notify_detached(
        state.notifier.clone(),
        OrderNotification::for_order(NotificationEvent::OrderStatusChanged, &order, None),
    );
    Ok(order)
}

/// Cash-on-delivery bookkeeping: the restaurant marks the payment state on
/// live orders. Card payments are owned by the provider and stay immutable
/// here.
pub async fn correct_payment_status(
    state: &ServerState,
    order_id: i64,
    restaurant_id: i64,
    target: PaymentStatus,
) -> AppResult<Order> {
    let order = order_repo::require(&state.db, order_id).await?;
    Actor::Restaurant(restaurant_id).ensure_owns(&order)?;
    state_machine::correct_payment(order.status, order.payment_method)?;

    let updated = order_repo::update_payment_status(&state.db, order_id, target).await?;
    if !updated {
        // The SQL guard only skips terminal orders, so that is what changed
        let current = order_repo::require(&state.db, order_id).await?;
        return Err(state_machine::TransitionError::Terminal(current.status).into());
    }

    let order = order_repo::require(&state.db, order_id).await?;
    tracing::info!(order_id, restaurant_id, payment_status = %order.payment_status, "Payment status corrected");
    Ok(order)
}
