//! Catalog price resolver
//!
//! Resolves the priced identity of a cart/order line: base price plus the
//! selected variation modifiers and add-on prices. Option prices are
//! batched per request — collect every referenced option id across all
//! lines, fetch each family once, then price lines from in-memory maps.
//!
//! An option id that does not resolve, or that belongs to a different menu
//! item, is a hard pricing error rather than a silent skip: a line that
//! cannot be priced exactly must not reach an order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::SelectionSet;
use shared::models::{CartLineDetail, OptionPrice};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::repository::{RepoError, menu};
use crate::pricing::money::to_decimal;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("variation option {0} does not exist or is inactive")]
    UnknownVariationOption(i64),

    #[error("add-on option {0} does not exist or is inactive")]
    UnknownAddOnOption(i64),

    #[error("option {option_id} does not belong to menu item {menu_item_id}")]
    ForeignOption { option_id: i64, menu_item_id: i64 },

    #[error("invalid selection data: {0}")]
    MalformedSelection(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Option prices for one request, keyed by option id and carrying the
/// owning menu item for cross-item checks.
#[derive(Debug, Default)]
pub struct PriceCatalog {
    variation_options: HashMap<i64, (i64, Decimal)>,
    add_on_options: HashMap<i64, (i64, Decimal)>,
}

impl PriceCatalog {
    /// Batch-load every option referenced by the given cart lines.
    pub async fn load(pool: &SqlitePool, lines: &[CartLineDetail]) -> Result<Self, PricingError> {
        let mut variation_ids = Vec::new();
        let mut add_on_ids = Vec::new();
        for line in lines {
            let selection = line
                .selection_set()
                .map_err(|e| PricingError::MalformedSelection(e.to_string()))?;
            variation_ids.extend(selection.variation_option_ids());
            add_on_ids.extend(selection.add_on_option_ids());
        }
        variation_ids.sort_unstable();
        variation_ids.dedup();
        add_on_ids.sort_unstable();
        add_on_ids.dedup();

        let variation_rows = menu::variation_option_prices(pool, &variation_ids).await?;
        let add_on_rows = menu::add_on_option_prices(pool, &add_on_ids).await?;
        Ok(Self::from_rows(variation_rows, add_on_rows))
    }

    /// Build directly from fetched rows (also the unit-test entry point).
    pub fn from_rows(variation_rows: Vec<OptionPrice>, add_on_rows: Vec<OptionPrice>) -> Self {
        let variation_options = variation_rows
            .into_iter()
            .map(|r| (r.id, (r.menu_item_id, to_decimal(r.price))))
            .collect();
        let add_on_options = add_on_rows
            .into_iter()
            .map(|r| (r.id, (r.menu_item_id, to_decimal(r.price))))
            .collect();
        Self { variation_options, add_on_options }
    }

    /// One unit price = base price + Σ variation modifiers + Σ add-on
    /// prices, unrounded (rounding happens at the aggregate).
    pub fn unit_price(
        &self,
        menu_item_id: i64,
        base_price: f64,
        selection: &SelectionSet,
    ) -> Result<Decimal, PricingError> {
        let mut price = to_decimal(base_price);

        for choice in &selection.variations {
            let (owner, modifier) = self
                .variation_options
                .get(&choice.option_id)
                .ok_or(PricingError::UnknownVariationOption(choice.option_id))?;
            if *owner != menu_item_id {
                return Err(PricingError::ForeignOption {
                    option_id: choice.option_id,
                    menu_item_id,
                });
            }
            price += *modifier;
        }

        for add_on in &selection.add_ons {
            for option_id in &add_on.option_ids {
                let (owner, option_price) = self
                    .add_on_options
                    .get(option_id)
                    .ok_or(PricingError::UnknownAddOnOption(*option_id))?;
                if *owner != menu_item_id {
                    return Err(PricingError::ForeignOption {
                        option_id: *option_id,
                        menu_item_id,
                    });
                }
                price += *option_price;
            }
        }

        Ok(price)
    }
}

impl From<PricingError> for crate::utils::AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Repo(repo) => repo.into(),
            other => crate::utils::AppError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::selection::{AddOnChoice, VariationChoice};

    fn catalog() -> PriceCatalog {
        PriceCatalog::from_rows(
            vec![
                OptionPrice { id: 10, menu_item_id: 1, price: 2.0 },
                OptionPrice { id: 11, menu_item_id: 1, price: 0.0 },
                OptionPrice { id: 20, menu_item_id: 2, price: 3.0 },
            ],
            vec![
                OptionPrice { id: 30, menu_item_id: 1, price: 0.5 },
                OptionPrice { id: 31, menu_item_id: 1, price: 1.25 },
            ],
        )
    }

    fn selection(variation_opts: &[i64], add_on_opts: &[i64]) -> SelectionSet {
        SelectionSet {
            variations: variation_opts
                .iter()
                .map(|&option_id| VariationChoice { variation_id: 1, option_id })
                .collect(),
            add_ons: if add_on_opts.is_empty() {
                vec![]
            } else {
                vec![AddOnChoice { add_on_id: 1, option_ids: add_on_opts.to_vec() }]
            },
        }
    }

    #[test]
    fn base_plus_modifiers_plus_add_ons() {
        let price = catalog()
            .unit_price(1, 10.0, &selection(&[10], &[30]))
            .unwrap();
        assert_eq!(price, to_decimal(12.5));
    }

    #[test]
    fn zero_modifier_options_are_free() {
        let price = catalog().unit_price(1, 10.0, &selection(&[11], &[])).unwrap();
        assert_eq!(price, to_decimal(10.0));
    }

    #[test]
    fn empty_selection_is_base_price() {
        let price = catalog()
            .unit_price(1, 7.25, &SelectionSet::default())
            .unwrap();
        assert_eq!(price, to_decimal(7.25));
    }

    #[test]
    fn unknown_option_is_a_pricing_error() {
        let err = catalog()
            .unit_price(1, 10.0, &selection(&[999], &[]))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownVariationOption(999)));

        let err = catalog()
            .unit_price(1, 10.0, &selection(&[], &[999]))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownAddOnOption(999)));
    }

    #[test]
    fn options_of_another_item_are_rejected() {
        // Option 20 exists but belongs to menu item 2
        let err = catalog()
            .unit_price(1, 10.0, &selection(&[20], &[]))
            .unwrap_err();
        assert!(matches!(err, PricingError::ForeignOption { option_id: 20, .. }));
    }
}
