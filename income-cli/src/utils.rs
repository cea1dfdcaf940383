use income_core::normalize_amount_text;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Parses a string into a [`Decimal`], strictly.
///
/// Accepts the same spellings as [`income_core::parse_amount`] (`"1,234.56"`,
/// `"200,000원"`) but reports malformed input instead of reading it as zero.
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_amount_text(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseDecimalError {
        input: s.to_string(),
        source: e,
    })
}

/// Parses an `id=amount` pair given on the command line.
pub fn parse_entry(s: &str) -> Result<(String, Decimal), String> {
    let (id, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=AMOUNT, got '{s}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing item id in '{s}'"));
    }
    let amount = parse_decimal(amount).map_err(|e| e.to_string())?;
    Ok((id.to_string(), amount))
}

/// Formats a won amount with thousands separators, e.g. `1,777,500원`.
///
/// Fractions are dropped after rounding to whole won.
pub fn format_won(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}원")
}

/// Formats a fractional rate as a percentage, e.g. `0.15` as `15%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
