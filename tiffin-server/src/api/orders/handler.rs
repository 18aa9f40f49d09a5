//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderLine, OrderStatus, PaymentStatus};
use validator::Validate;

use crate::core::ServerState;
use crate::orders::{self, service};
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// List a customer's orders, newest first.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders =
        service::list_orders_for_customer(&state.db, query.customer_id, query.limit, query.offset)
            .await?;
    Ok(ok(orders))
}

#[derive(Debug, Deserialize)]
pub struct GetQuery {
    pub customer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<GetQuery>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let (order, lines) = service::get_order_for_customer(&state.db, id, query.customer_id).await?;
    Ok(ok(OrderDetail { order, lines }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelRequest {
    pub order_id: i64,
    pub customer_id: i64,
    #[validate(length(min = 5, max = 500, message = "reason must be 5 to 500 characters"))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub order: Order,
    pub refund_initiated: bool,
}

/// Customer cancellation; only possible while the order is still pending.
pub async fn cancel(
    State(state): State<ServerState>,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<AppResponse<CancelResponse>>> {
    payload.validate()?;
    let outcome = orders::cancel_order(
        &state,
        payload.order_id,
        payload.customer_id,
        &payload.reason,
    )
    .await?;
    Ok(ok(CancelResponse {
        order: outcome.order,
        refund_initiated: outcome.refund_initiated,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order_id: i64,
    pub customer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub cart_id: i64,
    pub items_added: usize,
}

/// Rebuild the cart from a delivered or cancelled order.
pub async fn reorder(
    State(state): State<ServerState>,
    Json(payload): Json<ReorderRequest>,
) -> AppResult<Json<AppResponse<ReorderResponse>>> {
    let outcome = orders::reorder(&state, payload.order_id, payload.customer_id).await?;
    Ok(ok(ReorderResponse { cart_id: outcome.cart_id, items_added: outcome.items_added }))
}

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub restaurant_id: i64,
}

pub async fn accept(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AcceptRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = service::accept_order(&state, id, payload.restaurant_id).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeclineRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 5, max = 500, message = "reason must be 5 to 500 characters"))]
    pub reason: String,
}

pub async fn decline(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DeclineRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    payload.validate()?;
    let order = service::decline_order(&state, id, payload.restaurant_id, &payload.reason).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub restaurant_id: i64,
    pub status: OrderStatus,
}

/// Forward move along the delivery path (ACCEPTED ... DELIVERED).
pub async fn advance_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdvanceRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order =
        service::advance_status(&state, id, payload.restaurant_id, payload.status).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub restaurant_id: i64,
    pub payment_status: PaymentStatus,
}

/// Cash-on-delivery payment bookkeeping.
pub async fn correct_payment_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order =
        service::correct_payment_status(&state, id, payload.restaurant_id, payload.payment_status)
            .await?;
    Ok(ok(order))
}
