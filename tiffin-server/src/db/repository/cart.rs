//! Cart repository

use super::{RepoError, RepoResult};
use shared::models::{Cart, CartLine, CartLineDetail};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Option<Cart>> {
    let row = sqlx::query_as::<_, Cart>(
        "SELECT id, customer_id, created_at, updated_at FROM cart WHERE customer_id = ?",
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the customer's cart, creating it on first use (one cart per
/// customer, enforced by the unique index).
pub async fn get_or_create(pool: &SqlitePool, customer_id: i64) -> RepoResult<Cart> {
    if let Some(cart) = find_by_customer(pool, customer_id).await? {
        return Ok(cart);
    }
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let inserted = sqlx::query(
        "INSERT INTO cart (id, customer_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(now)
    .execute(pool)
    .await;
    if let Err(e) = inserted {
        let err = RepoError::from(e);
        // Concurrent first-use: someone else created it, fall through to the read
        if !matches!(err, RepoError::Duplicate(_)) {
            return Err(err);
        }
    }
    find_by_customer(pool, customer_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create cart".into()))
}

const LINE_DETAIL_SELECT: &str = "SELECT cl.id, cl.cart_id, cl.menu_item_id, cl.restaurant_id, \
     mi.name AS item_name, mi.base_price, cl.quantity, cl.note, cl.selections, cl.selection_signature \
     FROM cart_line cl JOIN menu_item mi ON cl.menu_item_id = mi.id";

/// Cart lines joined with the catalog data needed to price them.
pub async fn list_lines(pool: &SqlitePool, cart_id: i64) -> RepoResult<Vec<CartLineDetail>> {
    let sql = format!("{LINE_DETAIL_SELECT} WHERE cl.cart_id = ? ORDER BY cl.created_at, cl.id");
    let rows = sqlx::query_as::<_, CartLineDetail>(&sql)
        .bind(cart_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Lookup used by the signature merge: same cart, same item, same canonical
/// configuration.
pub async fn find_line_by_signature(
    pool: &SqlitePool,
    cart_id: i64,
    menu_item_id: i64,
    signature: &str,
) -> RepoResult<Option<CartLine>> {
    let row = sqlx::query_as::<_, CartLine>(
        "SELECT id, cart_id, menu_item_id, restaurant_id, quantity, note, selections, selection_signature, created_at, updated_at \
         FROM cart_line WHERE cart_id = ? AND menu_item_id = ? AND selection_signature = ?",
    )
    .bind(cart_id)
    .bind(menu_item_id)
    .bind(signature)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub struct NewCartLine<'a> {
    pub cart_id: i64,
    pub menu_item_id: i64,
    pub restaurant_id: i64,
    pub quantity: i64,
    pub note: Option<&'a str>,
    pub selections: &'a str,
    pub selection_signature: &'a str,
}

pub async fn insert_line(pool: &SqlitePool, line: NewCartLine<'_>) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO cart_line (id, cart_id, menu_item_id, restaurant_id, quantity, note, selections, selection_signature, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(line.cart_id)
    .bind(line.menu_item_id)
    .bind(line.restaurant_id)
    .bind(line.quantity)
    .bind(line.note)
    .bind(line.selections)
    .bind(line.selection_signature)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn increment_quantity(pool: &SqlitePool, line_id: i64, by: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE cart_line SET quantity = quantity + ?1, updated_at = ?2 WHERE id = ?3")
        .bind(by)
        .bind(now)
        .bind(line_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart line {line_id} not found")));
    }
    Ok(())
}

/// Delete all lines of a cart inside the checkout transaction, so order
/// creation and cart clearing commit or roll back as one unit.
pub async fn clear_lines_tx(conn: &mut SqliteConnection, cart_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM cart_line WHERE cart_id = ?")
        .bind(cart_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}
