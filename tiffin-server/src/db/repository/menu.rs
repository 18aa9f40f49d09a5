//! Menu catalog repository
//!
//! Read-only lookups plus the batched option-price queries behind cart and
//! checkout pricing: all referenced option ids are fetched in one IN query
//! per option family instead of per line.

use super::{RepoResult, placeholders};
use shared::models::{AddOnGroup, AddOnOption, MenuItem, OptionPrice, ProductVariation, VariationOption};
use sqlx::SqlitePool;

pub async fn find_item(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let row = sqlx::query_as::<_, MenuItem>(
        "SELECT id, restaurant_id, category_id, name, base_price, is_active, created_at, updated_at FROM menu_item WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Price every referenced variation option in one query, joined back to the
/// menu item it belongs to.
pub async fn variation_option_prices(
    pool: &SqlitePool,
    option_ids: &[i64],
) -> RepoResult<Vec<OptionPrice>> {
    if option_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT vo.id, pv.menu_item_id, vo.price_modifier AS price \
         FROM variation_option vo \
         JOIN product_variation pv ON vo.variation_id = pv.id \
         WHERE vo.is_active = 1 AND vo.id IN ({})",
        placeholders(option_ids.len())
    );
    let mut query = sqlx::query_as::<_, OptionPrice>(&sql);
    for id in option_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Same as [`variation_option_prices`] for add-on options.
pub async fn add_on_option_prices(
    pool: &SqlitePool,
    option_ids: &[i64],
) -> RepoResult<Vec<OptionPrice>> {
    if option_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT ao.id, ag.menu_item_id, ao.price \
         FROM add_on_option ao \
         JOIN add_on_group ag ON ao.add_on_id = ag.id \
         WHERE ao.is_active = 1 AND ao.id IN ({})",
        placeholders(option_ids.len())
    );
    let mut query = sqlx::query_as::<_, OptionPrice>(&sql);
    for id in option_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Variation groups declared on a menu item.
pub async fn variations_for_item(
    pool: &SqlitePool,
    menu_item_id: i64,
) -> RepoResult<Vec<ProductVariation>> {
    let rows = sqlx::query_as::<_, ProductVariation>(
        "SELECT id, menu_item_id, name, selection_mode FROM product_variation WHERE menu_item_id = ?",
    )
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active options of every variation group on a menu item.
pub async fn variation_options_for_item(
    pool: &SqlitePool,
    menu_item_id: i64,
) -> RepoResult<Vec<VariationOption>> {
    let rows = sqlx::query_as::<_, VariationOption>(
        "SELECT vo.id, vo.variation_id, vo.name, vo.price_modifier, vo.is_active \
         FROM variation_option vo \
         JOIN product_variation pv ON vo.variation_id = pv.id \
         WHERE pv.menu_item_id = ? AND vo.is_active = 1",
    )
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Add-on groups declared on a menu item.
pub async fn add_on_groups_for_item(
    pool: &SqlitePool,
    menu_item_id: i64,
) -> RepoResult<Vec<AddOnGroup>> {
    let rows = sqlx::query_as::<_, AddOnGroup>(
        "SELECT id, menu_item_id, name, is_required, max_selections FROM add_on_group WHERE menu_item_id = ?",
    )
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active options of every add-on group on a menu item.
pub async fn add_on_options_for_item(
    pool: &SqlitePool,
    menu_item_id: i64,
) -> RepoResult<Vec<AddOnOption>> {
    let rows = sqlx::query_as::<_, AddOnOption>(
        "SELECT ao.id, ao.add_on_id, ao.name, ao.price, ao.is_active \
         FROM add_on_option ao \
         JOIN add_on_group ag ON ao.add_on_id = ag.id \
         WHERE ag.menu_item_id = ? AND ao.is_active = 1",
    )
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
