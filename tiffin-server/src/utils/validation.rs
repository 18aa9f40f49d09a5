//! Input validation helpers
//!
//! Centralized length/amount limits and checks shared by the handlers and
//! the order services (decline/cancel reasons are validated where the
//! transition runs, not only at the HTTP edge).

use crate::utils::AppError;

// ── Limits ──────────────────────────────────────────────────────────

/// Notes, special instructions
pub const MAX_NOTE_LEN: usize = 500;

/// Decline/cancel reasons
pub const MIN_REASON_LEN: usize = 5;
pub const MAX_REASON_LEN: usize = 500;

/// Per-line quantity cap
pub const MAX_QUANTITY: i64 = 99;

/// Monetary inputs (tax, delivery fee) cap
pub const MAX_MONEY: f64 = 1_000_000.0;

// ── Helpers ─────────────────────────────────────────────────────────

/// Decline and cancellation reasons must carry some substance.
pub fn validate_reason(reason: &str) -> Result<(), AppError> {
    let trimmed = reason.trim();
    if trimmed.len() < MIN_REASON_LEN {
        return Err(AppError::validation(format!(
            "reason must be at least {MIN_REASON_LEN} characters"
        )));
    }
    if trimmed.len() > MAX_REASON_LEN {
        return Err(AppError::validation(format!(
            "reason is too long ({} chars, max {MAX_REASON_LEN})",
            trimmed.len()
        )));
    }
    Ok(())
}

/// Monetary inputs must be finite, non-negative and plausible.
pub fn validate_money(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!("{field} must be non-negative, got {value}")));
    }
    if value > MAX_MONEY {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_MONEY}), got {value}"
        )));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation(format!("quantity must be positive, got {quantity}")));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// Optional free text (line notes, special instructions).
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reasons_are_rejected() {
        assert!(validate_reason("no").is_err());
        assert!(validate_reason("   no   ").is_err());
        assert!(validate_reason("changed my mind").is_ok());
    }

    #[test]
    fn money_bounds() {
        assert!(validate_money(0.0, "tax").is_ok());
        assert!(validate_money(-0.01, "tax").is_err());
        assert!(validate_money(f64::NAN, "tax").is_err());
        assert!(validate_money(MAX_MONEY + 1.0, "tax").is_err());
    }

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }
}
