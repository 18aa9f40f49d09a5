//! Order repository
//!
//! Orders are append-only: inserts happen only inside the checkout
//! transaction, and every later mutation is a conditional UPDATE guarded on
//! the expected current status. Zero affected rows means a concurrent
//! transition won the race; callers surface that as a state conflict
//! instead of retrying.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderLine, OrderStatus, PaymentStatus};
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_SELECT: &str = "SELECT id, order_number, customer_id, restaurant_id, delivery_address_id, \
     status, payment_status, payment_method, subtotal, tax, delivery_fee, discount, total, \
     promo_code_id, payment_ref, special_instructions, decline_reason, cancel_reason, \
     idempotency_key, actual_delivery_time, placed_at, created_at, updated_at FROM orders";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row)
}

pub async fn find_by_idempotency_key(
    pool: &SqlitePool,
    customer_id: i64,
    key: &str,
) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE customer_id = ? AND idempotency_key = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_by_customer(
    pool: &SqlitePool,
    customer_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE customer_id = ? ORDER BY placed_at DESC LIMIT ? OFFSET ?");
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_lines(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLine>> {
    let rows = sqlx::query_as::<_, OrderLine>(
        "SELECT id, order_id, menu_item_id, item_name, unit_price, quantity, line_total, selections, note \
         FROM order_line WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert the order row inside the checkout transaction.
pub async fn insert_order_tx(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, customer_id, restaurant_id, delivery_address_id, \
         status, payment_status, payment_method, subtotal, tax, delivery_fee, discount, total, \
         promo_code_id, payment_ref, special_instructions, decline_reason, cancel_reason, \
         idempotency_key, actual_delivery_time, placed_at, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(order.restaurant_id)
    .bind(order.delivery_address_id)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.payment_method)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.delivery_fee)
    .bind(order.discount)
    .bind(order.total)
    .bind(order.promo_code_id)
    .bind(&order.payment_ref)
    .bind(&order.special_instructions)
    .bind(&order.decline_reason)
    .bind(&order.cancel_reason)
    .bind(&order.idempotency_key)
    .bind(order.actual_delivery_time)
    .bind(order.placed_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert one frozen line inside the checkout transaction.
pub async fn insert_line_tx(conn: &mut SqliteConnection, line: &OrderLine) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_line (id, order_id, menu_item_id, item_name, unit_price, quantity, line_total, selections, note) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(line.id)
    .bind(line.order_id)
    .bind(line.menu_item_id)
    .bind(&line.item_name)
    .bind(line.unit_price)
    .bind(line.quantity)
    .bind(line.line_total)
    .bind(&line.selections)
    .bind(&line.note)
    .execute(conn)
    .await?;
    Ok(())
}

/// Conditional status transition; returns false when the order was no
/// longer in `from` (a concurrent transition committed first).
pub async fn transition_status(
    pool: &SqlitePool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4")
        .bind(to)
        .bind(now)
        .bind(id)
        .bind(from)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// PENDING -> REJECTED with the restaurant's reason, conditionally.
pub async fn decline_with_reason(pool: &SqlitePool, id: i64, reason: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, decline_reason = ?2, updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(OrderStatus::Rejected)
    .bind(reason)
    .bind(now)
    .bind(id)
    .bind(OrderStatus::Pending)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// PENDING -> CANCELLED with the customer's reason, conditionally.
pub async fn cancel_with_reason(pool: &SqlitePool, id: i64, reason: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, cancel_reason = ?2, updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(OrderStatus::Cancelled)
    .bind(reason)
    .bind(now)
    .bind(id)
    .bind(OrderStatus::Pending)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Forward move to DELIVERED additionally stamps the actual delivery time.
pub async fn mark_delivered(pool: &SqlitePool, id: i64, from: OrderStatus) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, actual_delivery_time = ?2, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(OrderStatus::Delivered)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Payment-status correction, guarded against terminal orders at the SQL
/// level as well (capability and method checks happen in the service).
pub async fn update_payment_status(
    pool: &SqlitePool,
    id: i64,
    to: PaymentStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = ?1, updated_at = ?2 \
         WHERE id = ?3 AND status NOT IN ('DELIVERED', 'CANCELLED', 'REJECTED')",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Best-effort annotation after a successful refund call.
pub async fn mark_refunded(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE orders SET payment_status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(PaymentStatus::Refunded)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Reload an order that is known to exist (post-transition reads).
pub async fn require(pool: &SqlitePool, id: i64) -> RepoResult<Order> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}
