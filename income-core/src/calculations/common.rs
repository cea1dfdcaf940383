//! Common utility functions for income calculations.
//!
//! This module provides shared functionality used across the calculator
//! steps, including rounding to whole won and clamping at zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to whole won using half-up rounding.
///
/// Values at exactly .5 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use income_core::calculations::common::round_won;
///
/// assert_eq!(round_won(dec!(177749.4)), dec!(177749));
/// assert_eq!(round_won(dec!(177749.5)), dec!(177750));
/// assert_eq!(round_won(dec!(-10.5)), dec!(-11)); // Away from zero
/// ```
pub fn round_won(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the value, or zero when the value is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use income_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(250)), dec!(250));
/// assert_eq!(non_negative(dec!(-250)), dec!(0));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    if value > Decimal::ZERO { value } else { Decimal::ZERO }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_won tests
    // =========================================================================

    #[test]
    fn round_won_rounds_down_below_midpoint() {
        let result = round_won(dec!(1234.49));

        assert_eq!(result, dec!(1234));
    }

    #[test]
    fn round_won_rounds_up_at_midpoint() {
        let result = round_won(dec!(1234.5));

        assert_eq!(result, dec!(1235));
    }

    #[test]
    fn round_won_rounds_up_above_midpoint() {
        let result = round_won(dec!(1234.51));

        assert_eq!(result, dec!(1235));
    }

    #[test]
    fn round_won_handles_negative_values() {
        let result = round_won(dec!(-1234.5));

        assert_eq!(result, dec!(-1235));
    }

    #[test]
    fn round_won_preserves_whole_values() {
        let result = round_won(dec!(1777500));

        assert_eq!(result, dec!(1777500));
    }

    #[test]
    fn round_won_handles_long_fractions() {
        // 10,000,000 / 12 * 12 leaves a recurring tail in decimal arithmetic
        let result = round_won(dec!(10000000) / dec!(12) * dec!(12));

        assert_eq!(result, dec!(10000000));
    }

    // =========================================================================
    // non_negative tests
    // =========================================================================

    #[test]
    fn non_negative_keeps_positive_values() {
        assert_eq!(non_negative(dec!(100)), dec!(100));
    }

    #[test]
    fn non_negative_clamps_negative_values() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
    }

    #[test]
    fn non_negative_keeps_zero() {
        assert_eq!(non_negative(dec!(0)), dec!(0));
    }
}
