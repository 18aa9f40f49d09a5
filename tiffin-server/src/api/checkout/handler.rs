//! Checkout API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderLine, PaymentMethod, serde_helpers};
use validator::Validate;

use crate::cart;
use crate::checkout::{self, CheckoutRequest};
use crate::core::ServerState;
use crate::promo::{self, PromoOutcome};
use crate::pricing::{to_decimal, to_f64};
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub customer_id: i64,
    pub promo_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryLine {
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i64,
    #[serde(with = "serde_helpers::money")]
    pub unit_price: f64,
    #[serde(with = "serde_helpers::money")]
    pub line_total: f64,
}

#[derive(Debug, Serialize)]
pub struct PromoSummary {
    pub code: String,
    pub valid: bool,
    #[serde(with = "serde_helpers::money_opt", skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
    pub restaurant_id: i64,
    pub lines: Vec<SummaryLine>,
    #[serde(with = "serde_helpers::money")]
    pub subtotal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo: Option<PromoSummary>,
}

/// Read-only checkout preview: priced cart plus, when a code is supplied,
/// the promo verdict with its reason (checkout itself never fails on a bad
/// code, so this is where the customer learns why one didn't apply).
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<AppResponse<CheckoutSummary>>> {
    let totals = cart::aggregate(&state.db, query.customer_id).await?;

    let promo = match &query.promo_code {
        None => None,
        Some(code) => {
            let now = shared::util::now_millis();
            Some(match promo::apply(&state.db, code, totals.restaurant_id, now).await? {
                PromoOutcome::Valid(valid) => PromoSummary {
                    code: code.trim().to_uppercase(),
                    valid: true,
                    discount: Some(to_f64(promo::discount_amount(
                        totals.subtotal,
                        valid.discount_percentage,
                    ))),
                    reason: None,
                },
                PromoOutcome::Invalid(rejection) => PromoSummary {
                    code: code.trim().to_uppercase(),
                    valid: false,
                    discount: None,
                    reason: Some(rejection.message().to_string()),
                },
            })
        }
    };

    let lines = totals
        .lines
        .iter()
        .map(|priced| SummaryLine {
            menu_item_id: priced.line.menu_item_id,
            item_name: priced.line.item_name.clone(),
            quantity: priced.line.quantity,
            unit_price: to_f64(priced.unit_price),
            line_total: to_f64(priced.line_total),
        })
        .collect();

    Ok(ok(CheckoutSummary {
        restaurant_id: totals.restaurant_id,
        lines,
        subtotal: to_f64(totals.subtotal),
        promo,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    pub delivery_address_id: i64,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 128, message = "payment_ref is too long"))]
    pub payment_ref: Option<String>,
    #[validate(length(max = 64, message = "promo_code is too long"))]
    pub promo_code: Option<String>,
    #[serde(with = "serde_helpers::money")]
    pub tax: f64,
    #[serde(with = "serde_helpers::money")]
    pub delivery_fee: f64,
    #[validate(length(max = 500, message = "special_instructions is too long"))]
    pub special_instructions: Option<String>,
    #[validate(length(min = 1, max = 100, message = "idempotency_key length is invalid"))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    /// True when an idempotency-key replay returned the earlier order.
    pub reused: bool,
}

pub async fn create_order(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<AppResponse<CreateOrderResponse>>> {
    payload.validate()?;

    let placed = checkout::create_order(
        &state,
        CheckoutRequest {
            customer_id: payload.customer_id,
            delivery_address_id: payload.delivery_address_id,
            payment_method: payload.payment_method,
            payment_ref: payload.payment_ref,
            promo_code: payload.promo_code,
            tax: to_f64(to_decimal(payload.tax)),
            delivery_fee: to_f64(to_decimal(payload.delivery_fee)),
            special_instructions: payload.special_instructions,
            idempotency_key: payload.idempotency_key,
        },
    )
    .await?;

    Ok(ok(CreateOrderResponse {
        order: placed.order,
        lines: placed.lines,
        reused: placed.reused,
    }))
}
