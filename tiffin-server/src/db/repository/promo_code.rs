//! Promo code repository

use super::RepoResult;
use shared::models::PromoCode;
use sqlx::SqlitePool;

/// Case-insensitive lookup; codes are stored uppercase and the caller
/// normalizes the same way.
pub async fn find_by_code(pool: &SqlitePool, code_upper: &str) -> RepoResult<Option<PromoCode>> {
    let row = sqlx::query_as::<_, PromoCode>(
        "SELECT id, code, discount_percentage, starts_at, ends_at, restaurant_id, is_active, created_at \
         FROM promo_code WHERE code = ? AND is_active = 1",
    )
    .bind(code_upper)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
