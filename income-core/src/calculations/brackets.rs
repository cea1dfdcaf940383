//! Progressive income tax table.
//!
//! | Taxable standard (won)          | Rate | Progressive deduction |
//! |---------------------------------|------|-----------------------|
//! | ≤ 14,000,000                    | 6%   | 0                     |
//! | 14,000,000 – 50,000,000         | 15%  | 1,260,000             |
//! | 50,000,000 – 88,000,000         | 24%  | 5,760,000             |
//! | 88,000,000 – 150,000,000        | 35%  | 15,440,000            |
//! | 150,000,000 – 300,000,000       | 38%  | 19,940,000            |
//! | 300,000,000 – 500,000,000       | 40%  | 25,940,000            |
//! | 500,000,000 – 1,000,000,000     | 42%  | 35,940,000            |
//! | > 1,000,000,000                 | 45%  | 65,940,000            |
//!
//! Each range excludes its lower bound and includes its upper bound.

use std::sync::LazyLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::TaxBracket;
use crate::calculations::CalculatorError;

static DEFAULT_BRACKETS: LazyLock<Vec<TaxBracket>> = LazyLock::new(|| {
    [
        (dec!(0), Some(dec!(14000000)), dec!(0.06), dec!(0)),
        (dec!(14000000), Some(dec!(50000000)), dec!(0.15), dec!(1260000)),
        (dec!(50000000), Some(dec!(88000000)), dec!(0.24), dec!(5760000)),
        (dec!(88000000), Some(dec!(150000000)), dec!(0.35), dec!(15440000)),
        (dec!(150000000), Some(dec!(300000000)), dec!(0.38), dec!(19940000)),
        (dec!(300000000), Some(dec!(500000000)), dec!(0.40), dec!(25940000)),
        (dec!(500000000), Some(dec!(1000000000)), dec!(0.42), dec!(35940000)),
        (dec!(1000000000), None, dec!(0.45), dec!(65940000)),
    ]
    .into_iter()
    .map(|(min, max, rate, progressive_deduction)| TaxBracket {
        min,
        max,
        rate,
        progressive_deduction,
    })
    .collect()
});

/// The statutory eight-row table.
pub fn default_brackets() -> &'static [TaxBracket] {
    &DEFAULT_BRACKETS
}

/// Checks that a table partitions `(0, ∞)` without gaps or overlaps.
///
/// # Errors
///
/// Returns [`CalculatorError`] if:
/// - the table is empty
/// - the first bracket does not start at zero
/// - a bracket's `max` differs from the next bracket's `min`
/// - an open-ended bracket is not the last row
/// - a rate is outside `[0, 1]` or a progressive deduction is negative
pub fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), CalculatorError> {
    let first = brackets.first().ok_or(CalculatorError::NoTaxBrackets)?;
    if !first.min.is_zero() {
        return Err(CalculatorError::FirstBracketNotAtZero(first.min));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(CalculatorError::InvalidBracketRate {
                index,
                rate: bracket.rate,
            });
        }
        if bracket.progressive_deduction < Decimal::ZERO {
            return Err(CalculatorError::NegativeProgressiveDeduction {
                index,
                amount: bracket.progressive_deduction,
            });
        }

        match (bracket.max, brackets.get(index + 1)) {
            (Some(max), Some(next)) if max != next.min || max <= bracket.min => {
                return Err(CalculatorError::BracketsNotContiguous { index });
            }
            (Some(max), None) if max <= bracket.min => {
                return Err(CalculatorError::BracketsNotContiguous { index });
            }
            (None, Some(_)) => return Err(CalculatorError::OpenBracketNotLast { index }),
            _ => {}
        }
    }

    Ok(())
}

/// Finds the bracket for a positive taxable standard.
///
/// Amounts above a bounded top row use the top row.
pub(crate) fn find_bracket(
    brackets: &[TaxBracket],
    taxable_standard: Decimal,
) -> Option<&TaxBracket> {
    brackets
        .iter()
        .find(|b| b.contains(taxable_standard))
        .or_else(|| brackets.last().filter(|top| taxable_standard > top.min))
}
