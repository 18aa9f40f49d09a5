//! Selection structure validation
//!
//! Checks a requested selection against the catalog rules of the menu item
//! before it enters the cart: single-mode variations take exactly one
//! option, multiple-mode at least one, add-on groups respect their
//! max-selection cap, and every referenced option must belong to the item.
//! (Pricing re-verifies option existence at checkout; this pass gives the
//! customer a precise error at add time.)

use std::collections::{HashMap, HashSet};

use shared::SelectionSet;
use shared::models::SelectionMode;
use sqlx::SqlitePool;

use crate::db::repository::menu;
use crate::utils::{AppError, AppResult};

pub async fn validate_selection(
    pool: &SqlitePool,
    menu_item_id: i64,
    selection: &SelectionSet,
) -> AppResult<()> {
    let variations = menu::variations_for_item(pool, menu_item_id).await?;
    let variation_options = menu::variation_options_for_item(pool, menu_item_id).await?;
    let add_on_groups = menu::add_on_groups_for_item(pool, menu_item_id).await?;
    let add_on_options = menu::add_on_options_for_item(pool, menu_item_id).await?;

    let mut options_by_variation: HashMap<i64, HashSet<i64>> = HashMap::new();
    for opt in &variation_options {
        options_by_variation.entry(opt.variation_id).or_default().insert(opt.id);
    }
    let mut options_by_add_on: HashMap<i64, HashSet<i64>> = HashMap::new();
    for opt in &add_on_options {
        options_by_add_on.entry(opt.add_on_id).or_default().insert(opt.id);
    }

    // Chosen option count per variation group
    let mut chosen_per_variation: HashMap<i64, usize> = HashMap::new();
    for choice in &selection.variations {
        let Some(valid_options) = options_by_variation.get(&choice.variation_id) else {
            return Err(AppError::validation(format!(
                "variation {} does not exist on this item",
                choice.variation_id
            )));
        };
        if !valid_options.contains(&choice.option_id) {
            return Err(AppError::validation(format!(
                "option {} does not belong to variation {}",
                choice.option_id, choice.variation_id
            )));
        }
        *chosen_per_variation.entry(choice.variation_id).or_default() += 1;
    }

    // Every variation group on the item must be answered
    for variation in &variations {
        let chosen = chosen_per_variation.get(&variation.id).copied().unwrap_or(0);
        match variation.selection_mode {
            SelectionMode::Single if chosen != 1 => {
                return Err(AppError::validation(format!(
                    "variation '{}' requires exactly one option, got {chosen}",
                    variation.name
                )));
            }
            SelectionMode::Multiple if chosen == 0 => {
                return Err(AppError::validation(format!(
                    "variation '{}' requires at least one option",
                    variation.name
                )));
            }
            _ => {}
        }
    }

    // Add-on groups are optional unless required; caps apply when set
    let chosen_add_ons: HashMap<i64, &Vec<i64>> = selection
        .add_ons
        .iter()
        .map(|a| (a.add_on_id, &a.option_ids))
        .collect();

    for add_on in &selection.add_ons {
        let Some(valid_options) = options_by_add_on.get(&add_on.add_on_id) else {
            return Err(AppError::validation(format!(
                "add-on {} does not exist on this item",
                add_on.add_on_id
            )));
        };
        for option_id in &add_on.option_ids {
            if !valid_options.contains(option_id) {
                return Err(AppError::validation(format!(
                    "option {option_id} does not belong to add-on {}",
                    add_on.add_on_id
                )));
            }
        }
    }

    for group in &add_on_groups {
        let chosen = chosen_add_ons.get(&group.id).map(|o| o.len()).unwrap_or(0);
        if group.is_required && chosen == 0 {
            return Err(AppError::validation(format!(
                "add-on '{}' is required",
                group.name
            )));
        }
        if let Some(max) = group.max_selections
            && chosen as i64 > max
        {
            return Err(AppError::validation(format!(
                "add-on '{}' allows at most {max} options, got {chosen}",
                group.name
            )));
        }
    }

    Ok(())
}
