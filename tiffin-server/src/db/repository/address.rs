//! Delivery address repository

use super::RepoResult;
use shared::models::DeliveryAddress;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DeliveryAddress>> {
    let row = sqlx::query_as::<_, DeliveryAddress>(
        "SELECT id, customer_id, label, line1, line2, city, postal_code, phone, created_at, updated_at \
         FROM delivery_address WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
