//! Promo code validation and discount calculation
//!
//! Validation short-circuits on the first failure, each with a distinct
//! reason: existence, window start, window end, restaurant scope. The
//! checkout summary surfaces the reason to the customer; order creation
//! degrades an invalid code to a zero discount instead of failing.

use rust_decimal::Decimal;
use shared::models::PromoCode;
use sqlx::SqlitePool;

use crate::db::repository::RepoResult;
use crate::db::repository::promo_code as promo_repo;
use crate::pricing::{round_money, to_decimal};

/// Why a code did not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRejection {
    UnknownCode,
    NotYetValid,
    Expired,
    WrongRestaurant,
}

impl PromoRejection {
    pub fn message(self) -> &'static str {
        match self {
            PromoRejection::UnknownCode => "invalid promo code",
            PromoRejection::NotYetValid => "promo code is not yet valid",
            PromoRejection::Expired => "promo code has expired",
            PromoRejection::WrongRestaurant => "promo code is not applicable to this restaurant",
        }
    }
}

impl std::fmt::Display for PromoRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValidPromo {
    pub promo_code_id: i64,
    pub discount_percentage: f64,
}

#[derive(Debug, Clone, Copy)]
pub enum PromoOutcome {
    Valid(ValidPromo),
    Invalid(PromoRejection),
}

/// Pure window/scope validation against a fetched code.
///
/// Boundary semantics: `starts_at == now` is already valid; `ends_at < now`
/// by any amount is expired.
pub fn evaluate(
    code: &PromoCode,
    restaurant_id: i64,
    now: i64,
) -> Result<ValidPromo, PromoRejection> {
    if now < code.starts_at {
        return Err(PromoRejection::NotYetValid);
    }
    if now > code.ends_at {
        return Err(PromoRejection::Expired);
    }
    if let Some(scope) = code.restaurant_id
        && scope != restaurant_id
    {
        return Err(PromoRejection::WrongRestaurant);
    }
    Ok(ValidPromo {
        promo_code_id: code.id,
        discount_percentage: code.discount_percentage,
    })
}

/// Look the code up (case-insensitive, normalized to uppercase) and
/// validate it against the checkout's restaurant and the current time.
pub async fn apply(
    pool: &SqlitePool,
    raw_code: &str,
    restaurant_id: i64,
    now: i64,
) -> RepoResult<PromoOutcome> {
    let normalized = raw_code.trim().to_uppercase();
    let Some(code) = promo_repo::find_by_code(pool, &normalized).await? else {
        return Ok(PromoOutcome::Invalid(PromoRejection::UnknownCode));
    };
    Ok(match evaluate(&code, restaurant_id, now) {
        Ok(valid) => PromoOutcome::Valid(valid),
        Err(rejection) => PromoOutcome::Invalid(rejection),
    })
}

/// `round(subtotal × pct / 100, 2)`, never exceeding the subtotal.
pub fn discount_amount(subtotal: Decimal, discount_percentage: f64) -> Decimal {
    let raw = subtotal * to_decimal(discount_percentage) / Decimal::ONE_HUNDRED;
    round_money(raw).min(subtotal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::to_f64;

    fn code(starts_at: i64, ends_at: i64, restaurant_id: Option<i64>) -> PromoCode {
        PromoCode {
            id: 77,
            code: "WELCOME10".to_string(),
            discount_percentage: 10.0,
            starts_at,
            ends_at,
            restaurant_id,
            is_active: true,
            created_at: 0,
        }
    }

    #[test]
    fn window_start_is_inclusive() {
        let now = 1_000_000;
        let valid = evaluate(&code(now, now + 10, None), 1, now).unwrap();
        assert_eq!(valid.promo_code_id, 77);
    }

    #[test]
    fn not_yet_valid_before_start() {
        let now = 1_000_000;
        let err = evaluate(&code(now + 1, now + 10, None), 1, now).unwrap_err();
        assert_eq!(err, PromoRejection::NotYetValid);
    }

    #[test]
    fn expired_one_millisecond_after_end() {
        let now = 1_000_000;
        let err = evaluate(&code(0, now - 1, None), 1, now).unwrap_err();
        assert_eq!(err, PromoRejection::Expired);
        // End boundary itself is still valid
        assert!(evaluate(&code(0, now, None), 1, now).is_ok());
    }

    #[test]
    fn restaurant_scope_must_match() {
        let now = 1_000_000;
        let err = evaluate(&code(0, now + 10, Some(5)), 1, now).unwrap_err();
        assert_eq!(err, PromoRejection::WrongRestaurant);
        assert!(evaluate(&code(0, now + 10, Some(1)), 1, now).is_ok());
    }

    #[test]
    fn unscoped_code_applies_anywhere() {
        let now = 1_000_000;
        assert!(evaluate(&code(0, now + 10, None), 42, now).is_ok());
    }

    #[test]
    fn discount_is_rounded_to_cents() {
        // 10% of 25.00 -> 2.50
        assert_eq!(to_f64(discount_amount(to_decimal(25.0), 10.0)), 2.5);
        // 33% of 9.99 -> 3.2967 -> 3.30
        assert_eq!(to_f64(discount_amount(to_decimal(9.99), 33.0)), 3.3);
    }

    #[test]
    fn discount_never_exceeds_subtotal() {
        assert_eq!(to_f64(discount_amount(to_decimal(5.0), 100.0)), 5.0);
    }
}
