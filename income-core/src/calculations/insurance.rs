//! Employee social insurance contributions.
//!
//! | Contribution         | Rate    | Monthly base                    |
//! |----------------------|---------|---------------------------------|
//! | National pension     | 4.5%    | clamped to 370,000 – 5,530,000  |
//! | Health insurance     | 3.545%  | at most 12,000,000              |
//! | Long-term care       | 12.95%  | of the health insurance amount  |
//! | Employment insurance | 0.9%    | at most 9,000,000               |
//! | Workers' comp.       | 0.6%    | unclamped                       |
//!
//! The base is the monthly taxable income. Bounds are applied in monthly
//! terms and the contribution is annualised; the arithmetic works on the
//! annual figure with the bounds multiplied by 12, which is the same value
//! without a recurring division.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::SocialInsurance;
use crate::calculations::CalculatorError;
use crate::calculations::common::round_won;

const MONTHS: Decimal = dec!(12);

/// Rates and monthly base limits for the five contributions.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use income_core::calculations::SocialInsuranceRates;
///
/// let rates = SocialInsuranceRates::default();
///
/// assert_eq!(rates.national_pension_rate, dec!(0.045));
/// assert_eq!(rates.health_base_ceiling, dec!(12000000));
/// assert!(rates.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialInsuranceRates {
    pub national_pension_rate: Decimal,
    /// Lowest monthly income the pension is levied on.
    pub pension_base_floor: Decimal,
    /// Highest monthly income the pension is levied on.
    pub pension_base_ceiling: Decimal,
    pub health_insurance_rate: Decimal,
    pub health_base_ceiling: Decimal,
    /// Applied to the health insurance amount, not to income.
    pub long_term_care_rate: Decimal,
    pub employment_insurance_rate: Decimal,
    pub employment_base_ceiling: Decimal,
    pub workers_compensation_rate: Decimal,
}

impl Default for SocialInsuranceRates {
    fn default() -> Self {
        Self {
            national_pension_rate: dec!(0.045),
            pension_base_floor: dec!(370000),
            pension_base_ceiling: dec!(5530000),
            health_insurance_rate: dec!(0.03545),
            health_base_ceiling: dec!(12000000),
            long_term_care_rate: dec!(0.1295),
            employment_insurance_rate: dec!(0.009),
            employment_base_ceiling: dec!(9000000),
            workers_compensation_rate: dec!(0.006),
        }
    }
}

impl SocialInsuranceRates {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError`] if:
    /// - any rate is outside `[0, 1]`
    /// - any base limit is negative
    /// - the pension floor is above the pension ceiling
    pub fn validate(&self) -> Result<(), CalculatorError> {
        let rates = [
            ("national_pension_rate", self.national_pension_rate),
            ("health_insurance_rate", self.health_insurance_rate),
            ("long_term_care_rate", self.long_term_care_rate),
            ("employment_insurance_rate", self.employment_insurance_rate),
            ("workers_compensation_rate", self.workers_compensation_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(CalculatorError::InvalidInsuranceRate { name, rate });
            }
        }

        let limits = [
            ("pension_base_floor", self.pension_base_floor),
            ("pension_base_ceiling", self.pension_base_ceiling),
            ("health_base_ceiling", self.health_base_ceiling),
            ("employment_base_ceiling", self.employment_base_ceiling),
        ];
        for (name, amount) in limits {
            if amount < Decimal::ZERO {
                return Err(CalculatorError::NegativeInsuranceBase { name, amount });
            }
        }

        if self.pension_base_floor > self.pension_base_ceiling {
            return Err(CalculatorError::PensionBaseInverted {
                floor: self.pension_base_floor,
                ceiling: self.pension_base_ceiling,
            });
        }

        Ok(())
    }

    /// Computes all contributions for an annual taxable income.
    ///
    /// Nothing is levied when there is no taxable income.
    pub fn contributions(
        &self,
        taxable_income_total: Decimal,
    ) -> SocialInsurance {
        if taxable_income_total <= Decimal::ZERO {
            return SocialInsurance::default();
        }

        let national_pension = self.national_pension(taxable_income_total);
        let health_insurance = self.health_insurance(taxable_income_total);
        let long_term_care = self.long_term_care(health_insurance);
        let employment_insurance = self.employment_insurance(taxable_income_total);
        let workers_compensation = self.workers_compensation(taxable_income_total);

        SocialInsurance {
            national_pension,
            health_insurance,
            long_term_care,
            employment_insurance,
            workers_compensation,
            total: national_pension
                + health_insurance
                + long_term_care
                + employment_insurance
                + workers_compensation,
        }
    }

    fn national_pension(
        &self,
        annual: Decimal,
    ) -> Decimal {
        let base = annual
            .max(self.pension_base_floor * MONTHS)
            .min(self.pension_base_ceiling * MONTHS);
        round_won(base * self.national_pension_rate)
    }

    fn health_insurance(
        &self,
        annual: Decimal,
    ) -> Decimal {
        let base = annual.min(self.health_base_ceiling * MONTHS);
        round_won(base * self.health_insurance_rate)
    }

    fn long_term_care(
        &self,
        health_insurance: Decimal,
    ) -> Decimal {
        round_won(health_insurance * self.long_term_care_rate)
    }

    fn employment_insurance(
        &self,
        annual: Decimal,
    ) -> Decimal {
        let base = annual.min(self.employment_base_ceiling * MONTHS);
        round_won(base * self.employment_insurance_rate)
    }

    fn workers_compensation(
        &self,
        annual: Decimal,
    ) -> Decimal {
        round_won(annual * self.workers_compensation_rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_defaults() {
        assert_eq!(SocialInsuranceRates::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let rates = SocialInsuranceRates {
            health_insurance_rate: dec!(1.01),
            ..Default::default()
        };

        assert_eq!(
            rates.validate(),
            Err(CalculatorError::InvalidInsuranceRate {
                name: "health_insurance_rate",
                rate: dec!(1.01)
            })
        );
    }

    #[test]
    fn validate_rejects_negative_rate() {
        let rates = SocialInsuranceRates {
            workers_compensation_rate: dec!(-0.006),
            ..Default::default()
        };

        assert!(matches!(
            rates.validate(),
            Err(CalculatorError::InvalidInsuranceRate {
                name: "workers_compensation_rate",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_negative_base_limit() {
        let rates = SocialInsuranceRates {
            employment_base_ceiling: dec!(-1),
            ..Default::default()
        };

        assert!(matches!(
            rates.validate(),
            Err(CalculatorError::NegativeInsuranceBase {
                name: "employment_base_ceiling",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_inverted_pension_base() {
        let rates = SocialInsuranceRates {
            pension_base_floor: dec!(6000000),
            ..Default::default()
        };

        assert_eq!(
            rates.validate(),
            Err(CalculatorError::PensionBaseInverted {
                floor: dec!(6000000),
                ceiling: dec!(5530000)
            })
        );
    }

    // =========================================================================
    // contribution tests
    // =========================================================================

    #[test]
    fn contributions_for_mid_income() {
        let rates = SocialInsuranceRates::default();

        // 30,000,000 a year = 2,500,000 a month, inside every clamp
        let result = rates.contributions(dec!(30000000));

        assert_eq!(result.national_pension, dec!(1350000));
        assert_eq!(result.health_insurance, dec!(1063500));
        // 1,063,500 * 0.1295 = 137,723.25
        assert_eq!(result.long_term_care, dec!(137723));
        assert_eq!(result.employment_insurance, dec!(270000));
        assert_eq!(result.workers_compensation, dec!(180000));
        assert_eq!(result.total, dec!(3001223));
    }

    #[test]
    fn contributions_zero_income_levies_nothing() {
        let rates = SocialInsuranceRates::default();

        let result = rates.contributions(dec!(0));

        assert_eq!(result, SocialInsurance::default());
    }

    #[test]
    fn pension_applies_floor_for_small_income() {
        let rates = SocialInsuranceRates::default();

        // 1,200,000 a year = 100,000 a month, below the 370,000 floor
        let result = rates.national_pension(dec!(1200000));

        assert_eq!(result, dec!(199800));
    }

    #[test]
    fn pension_applies_ceiling_for_large_income() {
        let rates = SocialInsuranceRates::default();

        let result = rates.national_pension(dec!(120000000));

        // 5,530,000 * 12 * 0.045
        assert_eq!(result, dec!(2986200));
    }

    #[test]
    fn health_insurance_clamps_base_at_ceiling() {
        let rates = SocialInsuranceRates::default();

        // 15,000,000 a month
        let result = rates.health_insurance(dec!(180000000));

        // 12,000,000 * 12 * 0.03545
        assert_eq!(result, dec!(5104800));
    }

    #[test]
    fn health_insurance_at_exact_ceiling_matches_above_it() {
        let rates = SocialInsuranceRates::default();

        assert_eq!(
            rates.health_insurance(dec!(144000000)),
            rates.health_insurance(dec!(150000000))
        );
    }

    #[test]
    fn employment_insurance_clamps_base_at_ceiling() {
        let rates = SocialInsuranceRates::default();

        let result = rates.employment_insurance(dec!(180000000));

        // 9,000,000 * 12 * 0.009
        assert_eq!(result, dec!(972000));
    }

    #[test]
    fn workers_compensation_is_not_clamped() {
        let rates = SocialInsuranceRates::default();

        let result = rates.workers_compensation(dec!(180000000));

        assert_eq!(result, dec!(1080000));
    }

    #[test]
    fn long_term_care_uses_rounded_health_amount() {
        let rates = SocialInsuranceRates::default();

        let result = rates.long_term_care(dec!(5104800));

        // 5,104,800 * 0.1295 = 661,071.6
        assert_eq!(result, dec!(661072));
    }

    #[test]
    fn total_is_sum_of_rounded_parts() {
        let rates = SocialInsuranceRates::default();

        let result = rates.contributions(dec!(41234567));

        assert_eq!(
            result.total,
            result.national_pension
                + result.health_insurance
                + result.long_term_care
                + result.employment_insurance
                + result.workers_compensation
        );
    }
}
