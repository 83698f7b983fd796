//! Fixed-point amounts with 18 decimals, the precision both contracts declare.

use alloy_primitives::U256;
use alloy_primitives::utils::{ParseUnits, Unit};
use thiserror::Error;

pub const DECIMALS: usize = 18;

const UNIT: Unit = Unit::ETHER;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("enter an amount")]
    Empty,
    #[error("amount must be a positive decimal number")]
    Malformed,
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount has more than {} decimal places", DECIMALS)]
    TooManyDecimals,
    #[error("amount is too large")]
    Overflow,
}

/// Splits amount text into integer and fractional digits, checking syntax only.
fn split_amount(text: &str) -> Result<(&str, &str), AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }
    if text.starts_with('-') {
        return Err(AmountError::NotPositive);
    }

    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => {
            if fraction.is_empty() {
                return Err(AmountError::Malformed);
            }
            (integer, fraction)
        }
        None => (text, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if integer.is_empty() || !all_digits(integer) || !all_digits(fraction) {
        return Err(AmountError::Malformed);
    }
    if fraction.len() > DECIMALS {
        return Err(AmountError::TooManyDecimals);
    }

    Ok((integer, fraction))
}

/// Converts user-entered text into the raw on-chain amount (value × 10^18).
pub fn parse_amount(text: &str) -> Result<U256, AmountError> {
    let (integer, fraction) = split_amount(text)?;
    let text = if fraction.is_empty() {
        integer.to_owned()
    } else {
        format!("{integer}.{fraction}")
    };

    // The grammar above only lets unsigned decimals through, so any
    // remaining error is a value beyond 256 bits.
    let raw = match ParseUnits::parse_units(&text, UNIT) {
        Ok(ParseUnits::U256(raw)) => raw,
        Ok(ParseUnits::I256(_)) => return Err(AmountError::NotPositive),
        Err(_) => return Err(AmountError::Overflow),
    };

    if raw.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(raw)
}

/// Renders a raw amount for display: `5000000000000000000` → `5.0`,
/// `1500000000000000000` → `1.5`.
pub fn format_amount(raw: U256) -> String {
    let formatted = ParseUnits::U256(raw).format_units(UNIT);
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_owned()
    }
}

/// Canonical spelling of valid amount text, identical to what
/// [`format_amount`] produces for the parsed value.
pub fn canonicalize(text: &str) -> Result<String, AmountError> {
    let (integer, fraction) = split_amount(text)?;

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    Ok(format!("{integer}.{fraction}"))
}
