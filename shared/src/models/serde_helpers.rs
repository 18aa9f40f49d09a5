//! Serde helpers for model fields

use rust_decimal::prelude::*;

/// Render an f64 monetary amount as a fixed two-decimal string ("12.50").
pub fn format_money(value: f64) -> String {
    let mut dec = Decimal::from_f64(value).unwrap_or_default();
    dec = dec.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    dec.rescale(2);
    dec.to_string()
}

/// Money fields travel as decimal strings on the wire to avoid
/// floating-point drift, while staying f64 at rest. Deserialization
/// accepts either a string or a bare number.
pub mod money {
    use super::format_money;
    use rust_decimal::prelude::*;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_money(*value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Number(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(n) => Ok(n),
            StringOrNumber::Text(s) => {
                let dec = Decimal::from_str_exact(s.trim())
                    .map_err(|_| de::Error::custom(format!("invalid monetary amount: {s:?}")))?;
                dec.to_f64()
                    .ok_or_else(|| de::Error::custom(format!("monetary amount out of range: {s:?}")))
            }
        }
    }
}

/// Same as [`money`] for optional fields.
pub mod money_opt {
    use super::format_money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&format_money(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::money")] f64);
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
    }
}
