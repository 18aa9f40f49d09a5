//! Selection-set value object
//!
//! A cart line's chosen variation options and add-on options, with a
//! canonical order-independent signature. The signature is how "same
//! configuration" is detected when merging lines: add-to-cart, reorder and
//! saved-cart restore all go through it, so it lives here rather than in
//! any one call site.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One chosen option inside a variation group (e.g. Size -> Large).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationChoice {
    pub variation_id: i64,
    pub option_id: i64,
}

/// Chosen options inside an add-on group (e.g. Toppings -> [Cheese, Bacon]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnChoice {
    pub add_on_id: i64,
    pub option_ids: Vec<i64>,
}

/// The full configuration of a cart/order line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    #[serde(default)]
    pub variations: Vec<VariationChoice>,
    #[serde(default)]
    pub add_ons: Vec<AddOnChoice>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.variations.is_empty() && self.add_ons.is_empty()
    }

    /// Sort into canonical order: variations by variation id, each add-on's
    /// option list ascending, add-ons by add-on id. Duplicate entries are
    /// collapsed so `[a, a]` and `[a]` hash to the same configuration.
    pub fn canonicalize(&mut self) {
        self.variations.sort_by_key(|v| (v.variation_id, v.option_id));
        self.variations.dedup();
        for add_on in &mut self.add_ons {
            add_on.option_ids.sort_unstable();
            add_on.option_ids.dedup();
        }
        self.add_ons.sort_by_key(|a| a.add_on_id);
    }

    /// Deterministic encoding of the canonical form, e.g.
    /// `v2:7,v9:1|a4:1+5,a8:2`. Two selection sets describe the same
    /// configuration iff their signatures are equal.
    pub fn signature(&self) -> String {
        let mut canonical = self.clone();
        canonical.canonicalize();

        let mut out = String::new();
        for (i, v) in canonical.variations.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "v{}:{}", v.variation_id, v.option_id);
        }
        out.push('|');
        for (i, a) in canonical.add_ons.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "a{}:", a.add_on_id);
            for (j, opt) in a.option_ids.iter().enumerate() {
                if j > 0 {
                    out.push('+');
                }
                let _ = write!(out, "{opt}");
            }
        }
        out
    }

    /// All variation option ids referenced by this selection.
    pub fn variation_option_ids(&self) -> Vec<i64> {
        self.variations.iter().map(|v| v.option_id).collect()
    }

    /// All add-on option ids referenced by this selection.
    pub fn add_on_option_ids(&self) -> Vec<i64> {
        self.add_ons
            .iter()
            .flat_map(|a| a.option_ids.iter().copied())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SelectionSet {
        SelectionSet {
            variations: vec![
                VariationChoice { variation_id: 9, option_id: 1 },
                VariationChoice { variation_id: 2, option_id: 7 },
            ],
            add_ons: vec![
                AddOnChoice { add_on_id: 8, option_ids: vec![2] },
                AddOnChoice { add_on_id: 4, option_ids: vec![5, 1] },
            ],
        }
    }

    #[test]
    fn signature_is_order_independent() {
        let a = sample();
        let mut b = sample();
        b.variations.reverse();
        b.add_ons.reverse();
        b.add_ons.iter_mut().for_each(|x| x.option_ids.reverse());

        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature(), "v2:7,v9:1|a4:1+5,a8:2");
    }

    #[test]
    fn signature_distinguishes_different_options() {
        let a = sample();
        let mut b = sample();
        b.variations[0].option_id = 3;
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn duplicate_add_on_options_collapse() {
        let mut a = SelectionSet {
            variations: vec![],
            add_ons: vec![AddOnChoice { add_on_id: 4, option_ids: vec![5, 5, 1] }],
        };
        a.canonicalize();
        assert_eq!(a.add_ons[0].option_ids, vec![1, 5]);
    }

    #[test]
    fn empty_selection_has_stable_signature() {
        assert_eq!(SelectionSet::default().signature(), "|");
    }

    #[test]
    fn json_round_trip_preserves_signature() {
        let a = sample();
        let json = a.to_json().unwrap();
        let back = SelectionSet::from_json(&json).unwrap();
        assert_eq!(a.signature(), back.signature());
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let parsed = SelectionSet::from_json("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
