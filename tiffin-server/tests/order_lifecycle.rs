//! Order lifecycle end-to-end: transitions, the cancel/accept race,
//! refund gating and reorder merging.

mod common;

use common::*;
use shared::models::{OrderStatus, PaymentMethod, PaymentStatus};
use tiffin_server::checkout::{self, CheckoutRequest};
use tiffin_server::core::ServerState;
use tiffin_server::orders::{self, service};
use tiffin_server::utils::AppError;

const CUSTOMER: i64 = 1000;
const ADDRESS: i64 = 5000;

/// Seed an address and a filled cart, then place one order.
async fn place_order(
    state: &ServerState,
    payment_method: PaymentMethod,
    payment_ref: Option<&str>,
) -> shared::models::Order {
    seed_address(&state.db, ADDRESS, CUSTOMER).await;
    fill_cart(state, CUSTOMER, 2).await;
    checkout::create_order(
        state,
        CheckoutRequest {
            customer_id: CUSTOMER,
            delivery_address_id: ADDRESS,
            payment_method,
            payment_ref: payment_ref.map(str::to_string),
            promo_code: None,
            tax: 1.5,
            delivery_fee: 2.5,
            special_instructions: None,
            idempotency_key: None,
        },
    )
    .await
    .expect("checkout")
    .order
}

#[tokio::test]
async fn full_delivery_path_stamps_delivery_time() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    let order = service::accept_order(&env.state, order.id, RESTAURANT_PIZZA).await.unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);

    let order = service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Preparing)
        .await
        .unwrap();
    let order = service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Ready)
        .await
        .unwrap();
    let order =
        service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::OutForDelivery)
            .await
            .unwrap();
    assert!(order.actual_delivery_time.is_none());

    let order = service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.actual_delivery_time.is_some());

    // Terminal: nothing moves a delivered order
    let err = service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)), "got {err:?}");
}

#[tokio::test]
async fn forward_jumps_are_allowed_backward_moves_are_not() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;
    service::accept_order(&env.state, order.id, RESTAURANT_PIZZA).await.unwrap();

    // Jump straight to OUT_FOR_DELIVERY
    let order =
        service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::OutForDelivery)
            .await
            .unwrap();
    assert_eq!(order.status, OrderStatus::OutForDelivery);

    let err = service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("only forward moves"));
}

#[tokio::test]
async fn decline_requires_a_substantive_reason() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    let err = service::decline_order(&env.state, order.id, RESTAURANT_PIZZA, "no")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let order = service::decline_order(&env.state, order.id, RESTAURANT_PIZZA, "out of stock tonight")
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);
    assert_eq!(order.decline_reason.as_deref(), Some("out of stock tonight"));
}

#[tokio::test]
async fn restaurant_ownership_is_checked_before_any_transition() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    let err = service::accept_order(&env.state, order.id, RESTAURANT_SUSHI).await.unwrap_err();
    assert!(matches!(err, AppError::Ownership(_)), "got {err:?}");

    // Untouched
    let (order, _) = service::get_order_for_customer(&env.state.db, order.id, CUSTOMER)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn pending_cash_cancellation_triggers_no_refund() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    let outcome = orders::cancel_order(&env.state, order.id, CUSTOMER, "ordered by mistake")
        .await
        .unwrap();
    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert_eq!(outcome.order.cancel_reason.as_deref(), Some("ordered by mistake"));
    assert!(!outcome.refund_initiated);
    assert_eq!(env.payments.call_count(), 0);
}

#[tokio::test]
async fn pending_paid_card_cancellation_refunds_exactly_once() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Card, Some("tx_777")).await;
    assert_eq!(order.payment_status, PaymentStatus::Paid);

    let outcome = orders::cancel_order(&env.state, order.id, CUSTOMER, "changed my mind")
        .await
        .unwrap();
    assert!(outcome.refund_initiated);
    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert_eq!(outcome.order.payment_status, PaymentStatus::Refunded);

    assert_eq!(env.payments.call_count(), 1);
    let calls = env.payments.calls.lock().unwrap();
    assert_eq!(calls[0].payment_ref, "tx_777");
    assert_eq!(calls[0].amount, None); // full refund
}

#[tokio::test]
async fn refund_failure_does_not_block_cancellation() {
    let env = setup_with_gateway(RecordingGateway::failing()).await;
    let order = place_order(&env.state, PaymentMethod::Card, Some("tx_778")).await;

    let outcome = orders::cancel_order(&env.state, order.id, CUSTOMER, "changed my mind")
        .await
        .unwrap();
    // Cancellation succeeded, refund did not
    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert!(!outcome.refund_initiated);
    assert_eq!(outcome.order.payment_status, PaymentStatus::Paid);
    assert_eq!(env.payments.call_count(), 1);
}

#[tokio::test]
async fn unpaid_card_orders_do_not_qualify_for_refund() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Card, None).await;
    assert_eq!(order.payment_status, PaymentStatus::Pending);

    let outcome = orders::cancel_order(&env.state, order.id, CUSTOMER, "changed my mind")
        .await
        .unwrap();
    assert!(!outcome.refund_initiated);
    assert_eq!(env.payments.call_count(), 0);
}

#[tokio::test]
async fn cancellation_loses_to_acceptance() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Card, Some("tx_779")).await;

    service::accept_order(&env.state, order.id, RESTAURANT_PIZZA).await.unwrap();

    let err = orders::cancel_order(&env.state, order.id, CUSTOMER, "too slow, cancel it")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cannot cancel after acceptance"), "got {err}");
    // The guard fails before any side effect
    assert_eq!(env.payments.call_count(), 0);

    let (order, _) = service::get_order_for_customer(&env.state.db, order.id, CUSTOMER)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
}

#[tokio::test]
async fn acceptance_loses_to_cancellation() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    orders::cancel_order(&env.state, order.id, CUSTOMER, "ordered by mistake")
        .await
        .unwrap();

    let err = service::accept_order(&env.state, order.id, RESTAURANT_PIZZA).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)), "got {err:?}");
    assert!(err.to_string().contains("CANCELLED"));
}

#[tokio::test]
async fn strangers_cannot_cancel_or_read_someone_elses_order() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    let err = orders::cancel_order(&env.state, order.id, 424242, "not my order anyway")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Ownership(_)), "got {err:?}");

    let err = service::get_order_for_customer(&env.state.db, order.id, 424242)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Ownership(_)), "got {err:?}");
}

#[tokio::test]
async fn payment_correction_is_cash_only_and_pre_terminal() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    // Courier collected the cash on the doorstep
    let order =
        service::correct_payment_status(&env.state, order.id, RESTAURANT_PIZZA, PaymentStatus::Paid)
            .await
            .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);

    // Card orders stay with the provider
    seed_address(&env.state.db, 5002, 2000).await;
    let cart = tiffin_server::db::repository::cart::get_or_create(&env.state.db, 2000)
        .await
        .unwrap();
    tiffin_server::cart::merge_line(
        &env.state.db,
        cart.id,
        ITEM_MARGHERITA,
        RESTAURANT_PIZZA,
        1,
        None,
        &margherita_selection(),
    )
    .await
    .unwrap();
    let card_order = checkout::create_order(
        &env.state,
        CheckoutRequest {
            customer_id: 2000,
            delivery_address_id: 5002,
            payment_method: PaymentMethod::Card,
            payment_ref: Some("tx_900".to_string()),
            promo_code: None,
            tax: 0.0,
            delivery_fee: 0.0,
            special_instructions: None,
            idempotency_key: None,
        },
    )
    .await
    .unwrap()
    .order;
    let err = service::correct_payment_status(
        &env.state,
        card_order.id,
        RESTAURANT_PIZZA,
        PaymentStatus::Pending,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("cash-on-delivery"), "got {err}");

    // Terminal orders are closed books
    let order = service::accept_order(&env.state, order.id, RESTAURANT_PIZZA).await.unwrap();
    let order = service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Delivered)
        .await
        .unwrap();
    let err = service::correct_payment_status(
        &env.state,
        order.id,
        RESTAURANT_PIZZA,
        PaymentStatus::Pending,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)), "got {err:?}");
}

#[tokio::test]
async fn reordering_twice_merges_into_one_doubled_line() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    // Deliver it, then reorder twice into the now-empty cart
    service::accept_order(&env.state, order.id, RESTAURANT_PIZZA).await.unwrap();
    service::advance_status(&env.state, order.id, RESTAURANT_PIZZA, OrderStatus::Delivered)
        .await
        .unwrap();

    let first = orders::reorder(&env.state, order.id, CUSTOMER).await.unwrap();
    assert_eq!(first.items_added, 1);
    let second = orders::reorder(&env.state, order.id, CUSTOMER).await.unwrap();
    assert_eq!(second.cart_id, first.cart_id);

    let lines = tiffin_server::db::repository::cart::list_lines(&env.state.db, first.cart_id)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1, "identical signatures must merge");
    assert_eq!(lines[0].quantity, 4); // 2 from each reorder
    assert_eq!(lines[0].menu_item_id, ITEM_MARGHERITA);
}

#[tokio::test]
async fn cancelled_orders_can_be_reordered_live_ones_cannot() {
    let env = setup().await;
    let order = place_order(&env.state, PaymentMethod::Cash, None).await;

    let err = orders::reorder(&env.state, order.id, CUSTOMER).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)), "got {err:?}");

    orders::cancel_order(&env.state, order.id, CUSTOMER, "ordered by mistake")
        .await
        .unwrap();
    let outcome = orders::reorder(&env.state, order.id, CUSTOMER).await.unwrap();
    assert_eq!(outcome.items_added, 1);
}
