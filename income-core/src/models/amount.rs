//! Lenient handling of entered money amounts.
//!
//! Entered values come from forms and stored blobs. Anything that is not a
//! usable, non-negative number counts as zero so that a calculation can always
//! be produced.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Upper bound applied to every entered amount (10^15 won).
///
/// Keeps every product the calculator forms far inside the range of
/// [`Decimal`].
pub const MAX_ENTRY_AMOUNT: Decimal = dec!(1000000000000000);

/// Strips what people type around a won amount: surrounding and inner
/// whitespace, a trailing `원` and thousands separators.
///
/// ```
/// use income_core::normalize_amount_text;
///
/// assert_eq!(normalize_amount_text(" 1,500,000 원"), "1500000");
/// ```
pub fn normalize_amount_text(input: &str) -> String {
    input
        .trim()
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

/// Parses free text into an amount in won.
///
/// Accepts thousands separators, surrounding whitespace and a trailing `원`.
/// Exponent notation too large for [`Decimal`] saturates at
/// [`MAX_ENTRY_AMOUNT`]. Empty, unparseable and negative input yields zero.
pub fn parse_amount(input: &str) -> Decimal {
    let normalized = normalize_amount_text(input);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    if let Ok(value) = normalized.parse::<Decimal>() {
        return sanitize(value);
    }
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => sanitize_float(value),
        _ => {
            warn!(input = %input, "ignoring unparseable amount");
            Decimal::ZERO
        }
    }
}

/// Clamps an amount into `[0, MAX_ENTRY_AMOUNT]`.
pub(crate) fn sanitize(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, MAX_ENTRY_AMOUNT)
}

/// [`sanitize`] for numbers that may lie outside the range of [`Decimal`].
fn sanitize_float(value: f64) -> Decimal {
    if !value.is_finite() || value <= 0.0 {
        return Decimal::ZERO;
    }
    if value >= 1e15 {
        return MAX_ENTRY_AMOUNT;
    }
    Decimal::from_f64(value).map_or(Decimal::ZERO, sanitize)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Amount(Decimal),
    // Numbers beyond the range of Decimal, e.g. 1e30.
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawAmount {
    fn into_decimal(self) -> Decimal {
        match self {
            RawAmount::Amount(value) => sanitize(value),
            RawAmount::Float(value) => sanitize_float(value),
            RawAmount::Text(text) => parse_amount(&text),
            RawAmount::Other(_) => Decimal::ZERO,
        }
    }
}

/// `deserialize_with` target for `item id -> amount` maps.
pub(crate) fn deserialize_amount_map<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, RawAmount>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(id, amount)| (id, amount.into_decimal()))
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_amount_accepts_thousands_separators() {
        assert_eq!(parse_amount("30,000,000"), dec!(30000000));
        assert_eq!(parse_amount(" 1,234.5 "), dec!(1234.5));
    }

    #[test]
    fn parse_amount_strips_won_suffix() {
        assert_eq!(parse_amount("200,000원"), dec!(200000));
    }

    #[test]
    fn parse_amount_empty_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_invalid_is_zero() {
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("12x"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_negative_is_zero() {
        assert_eq!(parse_amount("-5000"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_clamps_to_ceiling() {
        assert_eq!(parse_amount("99999999999999999999"), MAX_ENTRY_AMOUNT);
    }

    #[derive(Deserialize)]
    struct Values {
        #[serde(default, deserialize_with = "deserialize_amount_map")]
        values: BTreeMap<String, Decimal>,
    }

    #[test]
    fn amount_map_accepts_numbers_and_strings() {
        let parsed: Values = serde_json::from_str(
            r#"{"values":{"a":1000,"b":"2,500","c":12.5,"d":"3000"}}"#,
        )
        .unwrap();

        assert_eq!(parsed.values["a"], dec!(1000));
        assert_eq!(parsed.values["b"], dec!(2500));
        assert_eq!(parsed.values["c"], dec!(12.5));
        assert_eq!(parsed.values["d"], dec!(3000));
    }

    #[test]
    fn amount_map_turns_junk_into_zero() {
        let parsed: Values = serde_json::from_str(
            r#"{"values":{"a":null,"b":"n/a","c":true,"d":[1,2]}}"#,
        )
        .unwrap();

        assert_eq!(parsed.values.len(), 4);
        assert!(parsed.values.values().all(|v| v.is_zero()));
    }

    #[test]
    fn amount_map_clamps_out_of_range_numbers() {
        let parsed: Values = serde_json::from_str(
            r#"{"values":{"a":1e30,"b":"1e30","c":99999999999999999999999999999999,"d":-5,"e":2e15}}"#,
        )
        .unwrap();

        assert_eq!(parsed.values["a"], MAX_ENTRY_AMOUNT);
        assert_eq!(parsed.values["b"], MAX_ENTRY_AMOUNT);
        assert_eq!(parsed.values["c"], MAX_ENTRY_AMOUNT);
        assert_eq!(parsed.values["d"], Decimal::ZERO);
        assert_eq!(parsed.values["e"], MAX_ENTRY_AMOUNT);
    }

    #[test]
    fn parse_amount_reads_exponent_notation() {
        assert_eq!(parse_amount("1e30"), MAX_ENTRY_AMOUNT);
        assert_eq!(parse_amount("2.5e6"), dec!(2500000));
        assert_eq!(parse_amount("-1e30"), Decimal::ZERO);
        assert_eq!(parse_amount("inf"), Decimal::ZERO);
    }

    #[test]
    fn normalize_strips_separators_and_suffix() {
        assert_eq!(normalize_amount_text(" 1,500,000 원"), "1500000");
        assert_eq!(normalize_amount_text("200,000원"), "200000");
        assert_eq!(normalize_amount_text("   "), "");
    }

    #[test]
    fn amount_map_missing_or_null_is_empty() {
        let missing: Values = serde_json::from_str("{}").unwrap();
        let null: Values = serde_json::from_str(r#"{"values":null}"#).unwrap();

        assert!(missing.values.is_empty());
        assert!(null.values.is_empty());
    }
}
