//! Order state machine
//!
//! Pure transition rules over [`OrderStatus`]; no I/O, no role knowledge
//! (capability checks happen in [`crate::orders::actor`] before these run).
//! Every rejection names the precondition that failed.
//!
//! ```text
//! PENDING -> ACCEPTED -> PREPARING -> READY -> OUT_FOR_DELIVERY -> DELIVERED
//!    |\
//!    | `-> REJECTED (restaurant declines, with reason)
//!    `--> CANCELLED (customer, grace period before the restaurant acts)
//! ```

use shared::models::{OrderStatus, PaymentMethod};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("order is already {0} and accepts no further transitions")]
    Terminal(OrderStatus),

    #[error("cannot cancel after acceptance (current status {0})")]
    CancelAfterAcceptance(OrderStatus),

    #[error("only pending orders can be {action} (current status {status})")]
    NotPending { action: &'static str, status: OrderStatus },

    #[error("order must be accepted before it can progress (current status {0})")]
    NotStarted(OrderStatus),

    #[error("cannot move from {from} to {to}: only forward moves are allowed")]
    NotForward { from: OrderStatus, to: OrderStatus },

    #[error("payment status can only be corrected on cash-on-delivery orders")]
    CardPaymentImmutable,
}

impl From<TransitionError> for crate::utils::AppError {
    fn from(err: TransitionError) -> Self {
        crate::utils::AppError::StateConflict(err.to_string())
    }
}

/// Restaurant accepts a pending order.
pub fn accept(from: OrderStatus) -> Result<OrderStatus, TransitionError> {
    match from {
        OrderStatus::Pending => Ok(OrderStatus::Accepted),
        s if s.is_terminal() => Err(TransitionError::Terminal(s)),
        s => Err(TransitionError::NotPending { action: "accepted", status: s }),
    }
}

/// Restaurant declines a pending order (the caller enforces the reason).
pub fn decline(from: OrderStatus) -> Result<OrderStatus, TransitionError> {
    match from {
        OrderStatus::Pending => Ok(OrderStatus::Rejected),
        s if s.is_terminal() => Err(TransitionError::Terminal(s)),
        s => Err(TransitionError::NotPending { action: "declined", status: s }),
    }
}

/// Customer cancellation is a grace-period operation: once the restaurant
/// has acted, the order can no longer be cancelled.
pub fn cancel(from: OrderStatus) -> Result<OrderStatus, TransitionError> {
    match from {
        OrderStatus::Pending => Ok(OrderStatus::Cancelled),
        s if s.is_terminal() => Err(TransitionError::Terminal(s)),
        s => Err(TransitionError::CancelAfterAcceptance(s)),
    }
}

/// Restaurant progresses an accepted order along the delivery path.
/// One-step or skipping moves are fine; backward moves never are.
pub fn advance(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, TransitionError> {
    if from.is_terminal() {
        return Err(TransitionError::Terminal(from));
    }
    if from == OrderStatus::Pending {
        return Err(TransitionError::NotStarted(from));
    }
    let (Some(from_rank), Some(to_rank)) = (from.rank(), to.rank()) else {
        return Err(TransitionError::NotForward { from, to });
    };
    if to_rank <= from_rank {
        return Err(TransitionError::NotForward { from, to });
    }
    Ok(to)
}

/// Payment-status corrections are a cash-on-delivery affordance only, and
/// only while the order is still live.
pub fn correct_payment(
    status: OrderStatus,
    method: PaymentMethod,
) -> Result<(), TransitionError> {
    if status.is_terminal() {
        return Err(TransitionError::Terminal(status));
    }
    if method == PaymentMethod::Card {
        return Err(TransitionError::CardPaymentImmutable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus::*;

    const ALL: [OrderStatus; 8] = [
        Pending,
        Accepted,
        Preparing,
        Ready,
        OutForDelivery,
        Delivered,
        Cancelled,
        Rejected,
    ];

    #[test]
    fn pending_reaches_exactly_three_states_in_one_step() {
        assert_eq!(accept(Pending), Ok(Accepted));
        assert_eq!(decline(Pending), Ok(Rejected));
        assert_eq!(cancel(Pending), Ok(Cancelled));
        // and nothing else: advance refuses to start from PENDING
        for to in ALL {
            assert!(advance(Pending, to).is_err());
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for from in [Delivered, Cancelled, Rejected] {
            assert_eq!(accept(from), Err(TransitionError::Terminal(from)));
            assert_eq!(decline(from), Err(TransitionError::Terminal(from)));
            assert_eq!(cancel(from), Err(TransitionError::Terminal(from)));
            for to in ALL {
                assert_eq!(advance(from, to), Err(TransitionError::Terminal(from)));
            }
        }
    }

    #[test]
    fn cancel_fails_cleanly_after_acceptance() {
        for from in [Accepted, Preparing, Ready, OutForDelivery] {
            assert_eq!(cancel(from), Err(TransitionError::CancelAfterAcceptance(from)));
        }
    }

    #[test]
    fn accept_and_decline_require_pending() {
        for from in [Accepted, Preparing, Ready, OutForDelivery] {
            assert!(matches!(accept(from), Err(TransitionError::NotPending { .. })));
            assert!(matches!(decline(from), Err(TransitionError::NotPending { .. })));
        }
    }

    #[test]
    fn advance_allows_single_and_skipping_forward_moves() {
        assert_eq!(advance(Accepted, Preparing), Ok(Preparing));
        assert_eq!(advance(Preparing, Ready), Ok(Ready));
        assert_eq!(advance(Ready, OutForDelivery), Ok(OutForDelivery));
        assert_eq!(advance(OutForDelivery, Delivered), Ok(Delivered));
        // direct forward jumps
        assert_eq!(advance(Accepted, Delivered), Ok(Delivered));
        assert_eq!(advance(Preparing, OutForDelivery), Ok(OutForDelivery));
    }

    #[test]
    fn advance_refuses_backward_and_sideways_moves() {
        assert_eq!(
            advance(Ready, Preparing),
            Err(TransitionError::NotForward { from: Ready, to: Preparing })
        );
        assert_eq!(
            advance(Accepted, Accepted),
            Err(TransitionError::NotForward { from: Accepted, to: Accepted })
        );
        assert_eq!(
            advance(Accepted, Pending),
            Err(TransitionError::NotForward { from: Accepted, to: Pending })
        );
        // Side branches are not on the forward path
        assert_eq!(
            advance(Accepted, Cancelled),
            Err(TransitionError::NotForward { from: Accepted, to: Cancelled })
        );
        assert_eq!(
            advance(Preparing, Rejected),
            Err(TransitionError::NotForward { from: Preparing, to: Rejected })
        );
    }

    #[test]
    fn payment_correction_is_cash_only_and_non_terminal() {
        use shared::models::PaymentMethod::*;
        assert!(correct_payment(Pending, Cash).is_ok());
        assert!(correct_payment(OutForDelivery, Cash).is_ok());
        assert_eq!(correct_payment(Pending, Card), Err(TransitionError::CardPaymentImmutable));
        assert_eq!(correct_payment(Delivered, Cash), Err(TransitionError::Terminal(Delivered)));
        assert_eq!(correct_payment(Cancelled, Cash), Err(TransitionError::Terminal(Cancelled)));
    }

    #[test]
    fn rejection_messages_name_the_precondition() {
        let msg = cancel(Accepted).unwrap_err().to_string();
        assert!(msg.contains("cannot cancel after acceptance"));
        let msg = advance(Ready, Accepted).unwrap_err().to_string();
        assert!(msg.contains("only forward moves"));
    }
}
