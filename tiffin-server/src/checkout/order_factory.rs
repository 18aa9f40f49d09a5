//! Order factory
//!
//! Turns a cart into a priced, persisted order in one logical transaction:
//! validate address ownership, price the cart, apply the promo, write the
//! order with its frozen lines and clear the cart as a single atomic unit,
//! then notify. Partial state between order creation and cart clearing is
//! not possible; any failure before commit rolls everything back.

use rust_decimal::Decimal;
use shared::models::{Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus};
use shared::util::{now_millis, snowflake_id};

use crate::cart;
use crate::collab::notify::{NotificationEvent, OrderNotification, notify_detached};
use crate::core::ServerState;
use crate::db::repository::{RepoError, address as address_repo, cart as cart_repo, order as order_repo};
use crate::pricing::{round_money, to_decimal, to_f64};
use crate::promo::{self, PromoOutcome};
use crate::utils::validation::{MAX_NOTE_LEN, validate_money, validate_optional_text};
use crate::utils::{AppError, AppResult};

/// Regenerations before giving up on an order-number collision.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_id: i64,
    pub delivery_address_id: i64,
    pub payment_method: PaymentMethod,
    /// Card orders placed after a successful capture carry the provider's
    /// transaction reference; it gates automatic refunds on cancellation.
    pub payment_ref: Option<String>,
    pub promo_code: Option<String>,
    pub tax: f64,
    pub delivery_fee: f64,
    pub special_instructions: Option<String>,
    /// Client-supplied key making retried checkouts create at most one order.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    /// True when an idempotency-key replay returned the earlier order.
    pub reused: bool,
}

pub async fn create_order(state: &ServerState, req: CheckoutRequest) -> AppResult<PlacedOrder> {
    validate_money(req.tax, "tax")?;
    validate_money(req.delivery_fee, "delivery_fee")?;
    validate_optional_text(&req.special_instructions, "special_instructions", MAX_NOTE_LEN)?;

    // Replayed checkout intent: hand back the order that was already created.
    if let Some(key) = &req.idempotency_key
        && let Some(existing) =
            order_repo::find_by_idempotency_key(&state.db, req.customer_id, key).await?
    {
        tracing::info!(
            order_id = existing.id,
            idempotency_key = %key,
            "Checkout replay detected, returning existing order"
        );
        let lines = order_repo::list_lines(&state.db, existing.id).await?;
        return Ok(PlacedOrder { order: existing, lines, reused: true });
    }

    let address = address_repo::find_by_id(&state.db, req.delivery_address_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Delivery address {} not found", req.delivery_address_id))
        })?;
    if address.customer_id != req.customer_id {
        return Err(AppError::ownership("delivery address belongs to a different customer"));
    }

    // Empty-cart / mixed-restaurant / pricing failures surface here.
    let totals = cart::aggregate(&state.db, req.customer_id).await?;

    let now = now_millis();
    let (promo_code_id, discount) = match &req.promo_code {
        None => (None, Decimal::ZERO),
        Some(code) => match promo::apply(&state.db, code, totals.restaurant_id, now).await? {
            PromoOutcome::Valid(valid) => (
                Some(valid.promo_code_id),
                promo::discount_amount(totals.subtotal, valid.discount_percentage),
            ),
            // Checkout does not hard-fail on a stale promo; it just buys nothing.
            PromoOutcome::Invalid(rejection) => {
                tracing::debug!(code = %code, reason = %rejection, "Promo code not applied");
                (None, Decimal::ZERO)
            }
        },
    };

    let subtotal = totals.subtotal;
    let tax = round_money(to_decimal(req.tax));
    let delivery_fee = round_money(to_decimal(req.delivery_fee));
    let total = subtotal + tax + delivery_fee - discount;

    let order_id = snowflake_id();
    let lines: Vec<OrderLine> = totals
        .lines
        .iter()
        .map(|priced| OrderLine {
            id: snowflake_id(),
            order_id,
            menu_item_id: priced.line.menu_item_id,
            item_name: priced.line.item_name.clone(),
            unit_price: to_f64(priced.unit_price),
            quantity: priced.line.quantity,
            line_total: to_f64(priced.line_total),
            selections: priced.line.selections.clone(),
            note: priced.line.note.clone(),
        })
        .collect();

    let payment_status = match (req.payment_method, &req.payment_ref) {
        (PaymentMethod::Card, Some(_)) => PaymentStatus::Paid,
        _ => PaymentStatus::Pending,
    };

    let mut order = Order {
        id: order_id,
        order_number: String::new(),
        customer_id: req.customer_id,
        restaurant_id: totals.restaurant_id,
        delivery_address_id: address.id,
        status: OrderStatus::Pending,
        payment_status,
        payment_method: req.payment_method,
        subtotal: to_f64(subtotal),
        tax: to_f64(tax),
        delivery_fee: to_f64(delivery_fee),
        discount: to_f64(discount),
        total: to_f64(total),
        promo_code_id,
        payment_ref: req.payment_ref.clone(),
        special_instructions: req.special_instructions.clone(),
        decline_reason: None,
        cancel_reason: None,
        idempotency_key: req.idempotency_key.clone(),
        actual_delivery_time: None,
        placed_at: now,
        created_at: now,
        updated_at: now,
    };

    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to open checkout transaction: {e}")))?;

    let mut attempts = 0;
    loop {
        order.order_number = crate::checkout::order_number::generate();
        match order_repo::insert_order_tx(&mut tx, &order).await {
            Ok(()) => break,
            Err(RepoError::Duplicate(msg)) if msg.contains("idempotency_key") => {
                // A concurrent replay of the same intent committed first.
                drop(tx);
                let key = req.idempotency_key.as_deref().unwrap_or_default();
                let existing = order_repo::find_by_idempotency_key(&state.db, req.customer_id, key)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal("idempotency conflict without a matching order")
                    })?;
                let lines = order_repo::list_lines(&state.db, existing.id).await?;
                return Ok(PlacedOrder { order: existing, lines, reused: true });
            }
            Err(RepoError::Duplicate(msg))
                if msg.contains("order_number") && attempts + 1 < MAX_ORDER_NUMBER_ATTEMPTS =>
            {
                attempts += 1;
                tracing::warn!(
                    order_number = %order.order_number,
                    attempt = attempts,
                    "Order number collision, regenerating"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    for line in &lines {
        order_repo::insert_line_tx(&mut tx, line).await?;
    }
    cart_repo::clear_lines_tx(&mut tx, totals.cart_id).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit checkout: {e}")))?;

    tracing::info!(
        order_id = order.id,
        order_number = %order.order_number,
        customer_id = order.customer_id,
        restaurant_id = order.restaurant_id,
        total = order.total,
        "Order placed"
    );

    notify_detached(
        state.notifier.clone(),
        OrderNotification::for_order(NotificationEvent::OrderPlaced, &order, None),
    );

    Ok(PlacedOrder { order, lines, reused: false })
}
