//! Cancellation/refund coordinator
//!
//! Customer cancellation is a state transition with a conditional side
//! effect: whether the order qualifies for an automatic refund is captured
//! *before* the mutation, the status change commits first, and the refund
//! call runs after — its failure is logged and reported, never allowed to
//! undo or block the cancellation.

use shared::models::{Order, OrderStatus, PaymentMethod, PaymentStatus};

use crate::collab::notify::{NotificationEvent, OrderNotification, notify_detached};
use crate::collab::payment::RefundRequest;
use crate::core::ServerState;
use crate::db::repository::order as order_repo;
use crate::orders::actor::Actor;
use crate::orders::state_machine;
use crate::utils::validation::validate_reason;
use crate::utils::AppResult;

#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub order: Order,
    /// False when no refund applied or the provider call failed; the
    /// cancellation itself succeeded either way.
    pub refund_initiated: bool,
}

/// An order qualifies for an automatic refund when it was still pending,
/// paid by card, captured, and carries the provider reference to refund
/// against.
fn qualifies_for_refund(order: &Order) -> bool {
    order.status == OrderStatus::Pending
        && order.payment_method == PaymentMethod::Card
        && order.payment_status == PaymentStatus::Paid
        && order.payment_ref.is_some()
}

pub async fn cancel_order(
    state: &ServerState,
    order_id: i64,
    customer_id: i64,
    reason: &str,
) -> AppResult<CancellationOutcome> {
    validate_reason(reason)?;
    let order = order_repo::require(&state.db, order_id).await?;
    Actor::Customer(customer_id).ensure_owns(&order)?;
    state_machine::cancel(order.status)?;

    // Captured before mutation: the post-update row is already CANCELLED.
    let refund_due = qualifies_for_refund(&order);

    let updated = order_repo::cancel_with_reason(&state.db, order_id, reason.trim()).await?;
    if !updated {
        // Lost the race against an accept/decline; report the precise guard
        let current = order_repo::require(&state.db, order_id).await?;
        return Err(match state_machine::cancel(current.status) {
            Err(e) => e.into(),
            Ok(_) => crate::utils::AppError::state_conflict("order changed concurrently, please retry"),
        });
    }

    let mut refund_initiated = false;
    if refund_due {
        let request = RefundRequest {
            order_id,
            payment_ref: order.payment_ref.clone().unwrap_or_default(),
            amount: None,
            actor_id: customer_id,
            actor_role: "customer".to_string(),
        };
        match state.payments.refund(request).await {
            Ok(result) => {
                refund_initiated = true;
                tracing::info!(order_id, refund_id = %result.refund_id, "Refund initiated");
                if let Err(e) = order_repo::mark_refunded(&state.db, order_id).await {
                    tracing::warn!(order_id, error = %e, "Failed to annotate refunded payment status");
                }
            }
            // The order stays cancelled regardless of the refund outcome
            Err(e) => {
                tracing::warn!(order_id, error = %e, "Refund call failed, order remains cancelled");
            }
        }
    }

    let order = order_repo::require(&state.db, order_id).await?;
    tracing::info!(order_id, customer_id, refund_initiated, "Order cancelled");
    notify_detached(
        state.notifier.clone(),
        OrderNotification::for_order(
            NotificationEvent::OrderCancelled,
            &order,
            Some(reason.trim().to_string()),
        ),
    );

    Ok(CancellationOutcome { order, refund_initiated })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(
        status: OrderStatus,
        method: PaymentMethod,
        payment_status: PaymentStatus,
        payment_ref: Option<&str>,
    ) -> Order {
        Order {
            id: 1,
            order_number: "TF-20260101-XYZ789".into(),
            customer_id: 10,
            restaurant_id: 20,
            delivery_address_id: 1,
            status,
            payment_status,
            payment_method: method,
            subtotal: 20.0,
            tax: 1.0,
            delivery_fee: 2.0,
            discount: 0.0,
            total: 23.0,
            promo_code_id: None,
            payment_ref: payment_ref.map(str::to_string),
            special_instructions: None,
            decline_reason: None,
            cancel_reason: None,
            idempotency_key: None,
            actual_delivery_time: None,
            placed_at: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn paid_card_order_with_reference_qualifies() {
        use OrderStatus::*;
        use PaymentMethod::*;
        use PaymentStatus::*;
        assert!(qualifies_for_refund(&order(OrderStatus::Pending, Card, Paid, Some("tx_1"))));
        // Any missing precondition disqualifies
        assert!(!qualifies_for_refund(&order(OrderStatus::Pending, Cash, Paid, Some("tx_1"))));
        assert!(!qualifies_for_refund(&order(OrderStatus::Pending, Card, PaymentStatus::Pending, Some("tx_1"))));
        assert!(!qualifies_for_refund(&order(OrderStatus::Pending, Card, Paid, None)));
        assert!(!qualifies_for_refund(&order(Accepted, Card, Paid, Some("tx_1"))));
    }
}
