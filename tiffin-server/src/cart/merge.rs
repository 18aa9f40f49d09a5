//! Signature-based cart merge
//!
//! The single primitive behind "same configuration" handling: add-to-cart,
//! reorder and saved-cart restore all merge through here, so an identical
//! item+selection combination always lands on one line with a summed
//! quantity instead of duplicate lines.

use shared::SelectionSet;
use sqlx::SqlitePool;

use crate::db::repository::cart as cart_repo;
use crate::utils::AppResult;

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub line_id: i64,
    /// True when an existing line absorbed the quantity.
    pub merged: bool,
}

/// Insert the configuration into the cart, or bump the quantity of the
/// existing line whose canonical signature matches.
pub async fn merge_line(
    pool: &SqlitePool,
    cart_id: i64,
    menu_item_id: i64,
    restaurant_id: i64,
    quantity: i64,
    note: Option<&str>,
    selection: &SelectionSet,
) -> AppResult<MergeOutcome> {
    let mut canonical = selection.clone();
    canonical.canonicalize();
    let signature = canonical.signature();

    if let Some(existing) =
        cart_repo::find_line_by_signature(pool, cart_id, menu_item_id, &signature).await?
    {
        cart_repo::increment_quantity(pool, existing.id, quantity).await?;
        return Ok(MergeOutcome { line_id: existing.id, merged: true });
    }

    let selections_json = canonical
        .to_json()
        .map_err(|e| crate::utils::AppError::internal(format!("selection encoding failed: {e}")))?;
    let line_id = cart_repo::insert_line(
        pool,
        cart_repo::NewCartLine {
            cart_id,
            menu_item_id,
            restaurant_id,
            quantity,
            note,
            selections: &selections_json,
            selection_signature: &signature,
        },
    )
    .await?;

    Ok(MergeOutcome { line_id, merged: false })
}
