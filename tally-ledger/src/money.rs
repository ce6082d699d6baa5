//! Wire-amount parsing and the exact-integer balance proof.
//!
//! Amounts travel as decimal strings with at most two fraction digits and are
//! converted to integer minor units (cents) before any arithmetic. No
//! floating point is involved at any stage.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::primitives::DebitOrCredit;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("InvalidAmount: '{0}' must be a non-negative decimal with at most two fraction digits")]
    InvalidAmount(String),
}

/// Matches `^\d+(\.\d{1,2})?$`.
fn is_well_formed(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(frac) => {
            (1..=2).contains(&frac.len()) && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// Canonical form: no leading zeros, no all-zero fractional part.
///
/// Malformed input is returned unchanged; the schema layer rejects it later.
pub fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if !is_well_formed(trimmed) {
        return raw.to_string();
    }
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (trimmed, None),
    };
    let int_part = {
        let stripped = int_part.trim_start_matches('0');
        if stripped.is_empty() {
            "0"
        } else {
            stripped
        }
    };
    match frac_part {
        Some(frac) if frac.bytes().any(|b| b != b'0') => format!("{int_part}.{frac}"),
        _ => int_part.to_string(),
    }
}

/// Converts a wire amount to integer minor units.
pub fn to_minor(raw: &str) -> Result<i64, MoneyError> {
    let canonical = canonicalize(raw);
    if !is_well_formed(&canonical) {
        return Err(MoneyError::InvalidAmount(raw.to_string()));
    }
    let value: Decimal = canonical
        .parse()
        .map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?;
    if value.is_sign_negative() {
        return Err(MoneyError::InvalidAmount(raw.to_string()));
    }
    (value * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| MoneyError::InvalidAmount(raw.to_string()))
}

/// True iff debits and credits cancel out exactly, in minor units.
pub fn is_balanced<'a, I>(lines: I) -> Result<bool, MoneyError>
where
    I: IntoIterator<Item = (DebitOrCredit, &'a str)>,
{
    let mut sum: i128 = 0;
    for (side, amount) in lines {
        let minor = i128::from(to_minor(amount)?);
        match side {
            DebitOrCredit::Debit => sum += minor,
            DebitOrCredit::Credit => sum -= minor,
        }
    }
    Ok(sum == 0)
}
