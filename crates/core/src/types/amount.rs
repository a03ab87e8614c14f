//! Decimal arithmetic for prices, taxes and discounts.
//!
//! WooCommerce reports money as decimal strings (sometimes empty), Holded as
//! JSON numbers. Everything in between is `rust_decimal::Decimal` so no
//! amount ever passes through binary floating point.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// Errors that can occur when parsing an amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a decimal number.
    #[error("invalid amount: {0:?}")]
    Invalid(String),
}

/// Parse an amount, treating blank input as zero.
///
/// Accepts plain (`"12.50"`) and scientific (`"1.5e2"`) notation.
///
/// # Errors
///
/// Returns [`AmountError::Invalid`] if the input is not a number.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AmountError::Invalid(raw.to_owned()))
}

/// `part` as a percentage of `base`, zero when `base` is zero.
#[must_use]
pub fn percent(part: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    part * Decimal::ONE_HUNDRED / base
}

/// Tax rate implied by a taxable base and the tax charged on it.
///
/// Rounded to a whole percentage: per-line tax amounts are themselves
/// rounded to cents, so the exact quotient drifts (1.73 on 8.26 is 20.94%).
#[must_use]
pub fn tax_rate(base: Decimal, tax: Decimal) -> Decimal {
    percent(tax, base)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Discount percentage taking `subtotal` down to `total`, to two decimals.
#[must_use]
pub fn discount_percent(subtotal: Decimal, total: Decimal) -> Decimal {
    percent(subtotal - total, subtotal)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Price of a single unit, zero when `quantity` is zero.
#[must_use]
pub fn unit_price(total: Decimal, quantity: Decimal) -> Decimal {
    if quantity.is_zero() {
        return Decimal::ZERO;
    }
    (total / quantity)
        .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Lenient `Decimal` deserializer for REST payloads.
///
/// Accepts numbers, numeric strings, empty strings and `null` (the last two
/// as zero). Use with `#[serde(default, deserialize_with = "lenient")]`.
///
/// # Errors
///
/// Fails if a string or number cannot be represented as a `Decimal`.
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(Decimal::ZERO),
        Some(serde_json::Value::String(s)) => {
            parse_amount(&s).map_err(serde::de::Error::custom)
        }
        Some(serde_json::Value::Number(n)) => {
            parse_amount(&n.to_string()).map_err(serde::de::Error::custom)
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a decimal amount, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_blank_is_zero() {
        assert_eq!(parse_amount(""), Ok(Decimal::ZERO));
        assert_eq!(parse_amount("  "), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_parse_amount_plain_and_scientific() {
        assert_eq!(parse_amount("12.50"), Ok(dec!(12.50)));
        assert_eq!(parse_amount("1.5e2"), Ok(dec!(150)));
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn test_tax_rate_absorbs_cent_rounding() {
        assert_eq!(tax_rate(dec!(8.26), dec!(1.73)), dec!(21));
        assert_eq!(tax_rate(dec!(100), dec!(10)), dec!(10));
        assert_eq!(tax_rate(dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn test_tax_rate_on_negative_fee() {
        assert_eq!(tax_rate(dec!(-5), dec!(-1.05)), dec!(21));
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(dec!(40), dec!(30)), dec!(25));
        assert_eq!(discount_percent(dec!(30), dec!(20)), dec!(33.33));
        assert_eq!(discount_percent(dec!(10), dec!(10)), dec!(0));
        assert_eq!(discount_percent(dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn test_unit_price() {
        assert_eq!(unit_price(dec!(30), dec!(3)), dec!(10));
        assert_eq!(unit_price(dec!(10), dec!(3)), dec!(3.333333));
        assert_eq!(unit_price(dec!(10), dec!(0)), dec!(0));
    }

    #[derive(Debug, Deserialize)]
    struct Line {
        #[serde(default, deserialize_with = "lenient")]
        total: Decimal,
    }

    #[test]
    fn test_lenient_accepts_rest_shapes() {
        let parse = |json: &str| serde_json::from_str::<Line>(json).map(|l| l.total).ok();
        assert_eq!(parse(r#"{"total":"19.99"}"#), Some(dec!(19.99)));
        assert_eq!(parse(r#"{"total":19.99}"#), Some(dec!(19.99)));
        assert_eq!(parse(r#"{"total":""}"#), Some(Decimal::ZERO));
        assert_eq!(parse(r#"{"total":null}"#), Some(Decimal::ZERO));
        assert_eq!(parse("{}"), Some(Decimal::ZERO));
        assert_eq!(parse(r#"{"total":[1]}"#), None);
    }
}
