//! Wage income tax and take-home pay.
//!
//! This module turns itemised income and deduction entries into net income
//! following a simplified model of Korean wage income tax and the mandatory
//! social insurances.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Taxable income total (sum of taxable items, annual) |
//! | 2    | Tax-exempt income total (monthly values × 12, capped per item) |
//! | 3    | Gross income (Step 1 + Step 2) |
//! | 4    | Employment income deduction (five-tier schedule on Step 1) |
//! | 5    | Taxable income after deduction (Step 1 - Step 4, minimum 0) |
//! | 6    | Total deductions (entered value, else item default, else 0) |
//! | 7    | Taxable standard (Step 5 - Step 6, minimum 0) |
//! | 8    | Income tax (bracket rate × Step 7 - progressive deduction, minimum 0) |
//! | 9    | Local income tax (Step 8 × 10%) |
//! | 10   | Social insurance (see [`SocialInsuranceRates`]) |
//! | 11   | Net income (Step 3 - Step 8 - Step 9 - Step 10, minimum 0) |
//! | 12   | Monthly net income (Step 11 / 12) |
//!
//! Every step rounds to whole won. The calculation itself cannot fail:
//! missing, negative and unknown entries count as zero. Only building a
//! calculator from a custom table or custom rates is fallible.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use income_core::calculations::calculate;
//! use income_core::{IncomeItem, IncomeKind};
//! use rust_decimal_macros::dec;
//!
//! let items = vec![IncomeItem {
//!     id: "base_salary".to_string(),
//!     name: "Base salary".to_string(),
//!     kind: IncomeKind::Taxable,
//!     category: "salary".to_string(),
//!     monthly_limit: None,
//!     order: 1,
//! }];
//! let values = BTreeMap::from([("base_salary".to_string(), dec!(30000000))]);
//!
//! let result = calculate(&items, &[], &values, &BTreeMap::new());
//!
//! assert_eq!(result.employment_income_deduction, dec!(9750000));
//! assert_eq!(result.taxable_standard, dec!(20250000));
//! assert_eq!(result.income_tax, dec!(1777500));
//! assert_eq!(result.local_income_tax, dec!(177750));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::debug;

use crate::calculations::brackets::{default_brackets, find_bracket, validate_brackets};
use crate::calculations::common::{non_negative, round_won};
use crate::calculations::insurance::SocialInsuranceRates;
use crate::models::amount::sanitize;
use crate::{
    CalculatedIncome, DeductionItem, GroupCalculation, IncomeGroup, IncomeItem, IncomeKind,
    PersonIncomeInput, TaxBracket,
};

const MONTHS: Decimal = dec!(12);
const LOCAL_INCOME_TAX_RATE: Decimal = dec!(0.1);

/// Errors that can occur while configuring an [`IncomeCalculator`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    /// No tax brackets were provided.
    #[error("no tax brackets provided")]
    NoTaxBrackets,

    /// The lowest bracket must start at zero.
    #[error("first tax bracket must start at 0, got {0}")]
    FirstBracketNotAtZero(Decimal),

    /// A bracket's upper bound is not the next bracket's lower bound.
    #[error("tax bracket {index} does not end where the next one starts")]
    BracketsNotContiguous { index: usize },

    /// Only the last bracket may be open-ended.
    #[error("tax bracket {index} is open-ended but is not the last bracket")]
    OpenBracketNotLast { index: usize },

    /// A bracket rate must be between 0 and 1.
    #[error("tax bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidBracketRate { index: usize, rate: Decimal },

    /// A progressive deduction must be non-negative.
    #[error("tax bracket {index} progressive deduction must be non-negative, got {amount}")]
    NegativeProgressiveDeduction { index: usize, amount: Decimal },

    /// A social insurance rate must be between 0 and 1.
    #[error("{name} must be between 0 and 1, got {rate}")]
    InvalidInsuranceRate { name: &'static str, rate: Decimal },

    /// A social insurance base limit must be non-negative.
    #[error("{name} must be non-negative, got {amount}")]
    NegativeInsuranceBase { name: &'static str, amount: Decimal },

    /// The pension floor must not exceed the pension ceiling.
    #[error("pension base floor {floor} exceeds ceiling {ceiling}")]
    PensionBaseInverted { floor: Decimal, ceiling: Decimal },
}

/// One tier of the employment income deduction schedule.
struct DeductionTier {
    /// Inclusive upper bound of taxable income; `None` for the last tier.
    upper: Option<Decimal>,
    base: Decimal,
    threshold: Decimal,
    rate: Decimal,
    cap: Decimal,
}

const EMPLOYMENT_DEDUCTION_TIERS: [DeductionTier; 5] = [
    DeductionTier {
        upper: Some(dec!(5000000)),
        base: dec!(0),
        threshold: dec!(0),
        rate: dec!(0.70),
        cap: dec!(7000000),
    },
    DeductionTier {
        upper: Some(dec!(15000000)),
        base: dec!(3500000),
        threshold: dec!(5000000),
        rate: dec!(0.40),
        cap: dec!(7000000),
    },
    DeductionTier {
        upper: Some(dec!(45000000)),
        base: dec!(7500000),
        threshold: dec!(15000000),
        rate: dec!(0.15),
        cap: dec!(12000000),
    },
    DeductionTier {
        upper: Some(dec!(100000000)),
        base: dec!(12000000),
        threshold: dec!(45000000),
        rate: dec!(0.05),
        cap: dec!(20000000),
    },
    DeductionTier {
        upper: None,
        base: dec!(14750000),
        threshold: dec!(100000000),
        rate: dec!(0.02),
        cap: dec!(20000000),
    },
];

/// Calculator for take-home pay.
///
/// Holds the bracket table and insurance rates; every `calculate*` call is a
/// pure function of its arguments and this configuration.
#[derive(Debug, Clone)]
pub struct IncomeCalculator<'a> {
    tax_brackets: &'a [TaxBracket],
    insurance: SocialInsuranceRates,
}

impl Default for IncomeCalculator<'static> {
    /// Statutory bracket table and default insurance rates.
    fn default() -> Self {
        Self {
            tax_brackets: default_brackets(),
            insurance: SocialInsuranceRates::default(),
        }
    }
}

impl<'a> IncomeCalculator<'a> {
    /// Creates a calculator with a custom bracket table and insurance rates.
    ///
    /// Brackets must be sorted by `min`, start at zero and be contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError`] if the table or the rates are invalid.
    pub fn new(
        tax_brackets: &'a [TaxBracket],
        insurance: SocialInsuranceRates,
    ) -> Result<Self, CalculatorError> {
        validate_brackets(tax_brackets)?;
        insurance.validate()?;
        Ok(Self {
            tax_brackets,
            insurance,
        })
    }

    pub fn tax_brackets(&self) -> &'a [TaxBracket] {
        self.tax_brackets
    }

    pub fn insurance(&self) -> &SocialInsuranceRates {
        &self.insurance
    }

    /// Runs every calculation step for one person.
    ///
    /// Iteration is driven by the item lists, so value-map entries whose id
    /// matches no item are ignored.
    pub fn calculate(
        &self,
        income_items: &[IncomeItem],
        deduction_items: &[DeductionItem],
        income_values: &BTreeMap<String, Decimal>,
        deduction_values: &BTreeMap<String, Decimal>,
    ) -> CalculatedIncome {
        let taxable_income_total = self.taxable_income_total(income_items, income_values);
        let tax_exempt_income_total = self.tax_exempt_income_total(income_items, income_values);
        let gross_income = taxable_income_total + tax_exempt_income_total;

        let employment_income_deduction = self.employment_income_deduction(taxable_income_total);
        let taxable_income_after_deduction =
            non_negative(taxable_income_total - employment_income_deduction);

        let total_deductions = self.total_deductions(deduction_items, deduction_values);
        let taxable_standard = non_negative(taxable_income_after_deduction - total_deductions);

        let (income_tax, marginal_rate) = self.income_tax(taxable_standard);
        let local_income_tax = self.local_income_tax(income_tax);

        let social_insurance = self.insurance.contributions(taxable_income_total);

        let net_income = self.net_income(
            gross_income,
            income_tax,
            local_income_tax,
            social_insurance.total,
        );
        let monthly_net_income = round_won(net_income / MONTHS);

        let ignored = income_values
            .keys()
            .filter(|id| !income_items.iter().any(|item| &item.id == *id))
            .count()
            + deduction_values
                .keys()
                .filter(|id| !deduction_items.iter().any(|item| &item.id == *id))
                .count();

        debug!(
            %gross_income,
            %taxable_standard,
            %income_tax,
            social_insurance = %social_insurance.total,
            %net_income,
            ignored_entries = ignored,
            "calculated income"
        );

        CalculatedIncome {
            taxable_income_total,
            tax_exempt_income_total,
            gross_income,
            employment_income_deduction,
            taxable_income_after_deduction,
            total_deductions,
            taxable_standard,
            marginal_rate,
            income_tax,
            local_income_tax,
            social_insurance,
            net_income,
            monthly_net_income,
        }
    }

    /// Runs [`calculate`](Self::calculate) with one person's entered values.
    pub fn calculate_person(
        &self,
        income_items: &[IncomeItem],
        deduction_items: &[DeductionItem],
        person: &PersonIncomeInput,
    ) -> CalculatedIncome {
        self.calculate(
            income_items,
            deduction_items,
            &person.income_values,
            &person.deduction_values,
        )
    }

    /// Calculates both people of a group and sums their results.
    pub fn calculate_group(
        &self,
        income_items: &[IncomeItem],
        deduction_items: &[DeductionItem],
        group: &IncomeGroup,
    ) -> GroupCalculation {
        let people = group
            .people
            .each_ref()
            .map(|person| self.calculate_person(income_items, deduction_items, person));

        let combined_gross_income: Decimal = people.iter().map(|p| p.gross_income).sum();
        let combined_net_income: Decimal = people.iter().map(|p| p.net_income).sum();
        let combined_monthly_net_income: Decimal =
            people.iter().map(|p| p.monthly_net_income).sum();

        GroupCalculation {
            group_id: group.id.clone(),
            group_name: group.name.clone(),
            person_names: group.people.each_ref().map(|person| person.name.clone()),
            people,
            combined_gross_income,
            combined_net_income,
            combined_monthly_net_income,
        }
    }

    /// Sums the entered annual values of taxable items.
    fn taxable_income_total(
        &self,
        income_items: &[IncomeItem],
        income_values: &BTreeMap<String, Decimal>,
    ) -> Decimal {
        let total: Decimal = income_items
            .iter()
            .filter(|item| item.kind == IncomeKind::Taxable)
            .map(|item| entered(income_values, &item.id))
            .sum();
        round_won(total)
    }

    /// Annualises the entered monthly values of tax-exempt items, each capped
    /// at its monthly limit.
    fn tax_exempt_income_total(
        &self,
        income_items: &[IncomeItem],
        income_values: &BTreeMap<String, Decimal>,
    ) -> Decimal {
        let total: Decimal = income_items
            .iter()
            .filter(|item| item.kind == IncomeKind::TaxExempt)
            .map(|item| {
                let annual = entered(income_values, &item.id) * MONTHS;
                match item.monthly_limit {
                    Some(limit) => annual.min(sanitize(limit) * MONTHS),
                    None => annual,
                }
            })
            .sum();
        round_won(total)
    }

    /// Applies the five-tier employment income deduction schedule.
    fn employment_income_deduction(
        &self,
        taxable_income_total: Decimal,
    ) -> Decimal {
        if taxable_income_total <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let tier = EMPLOYMENT_DEDUCTION_TIERS
            .iter()
            .find(|tier| tier.upper.is_none_or(|upper| taxable_income_total <= upper))
            .unwrap_or(&EMPLOYMENT_DEDUCTION_TIERS[EMPLOYMENT_DEDUCTION_TIERS.len() - 1]);

        let deduction = tier.base + (taxable_income_total - tier.threshold) * tier.rate;
        round_won(deduction.min(tier.cap))
    }

    /// Sums deduction entries, falling back to each item's default.
    fn total_deductions(
        &self,
        deduction_items: &[DeductionItem],
        deduction_values: &BTreeMap<String, Decimal>,
    ) -> Decimal {
        let total: Decimal = deduction_items
            .iter()
            .map(|item| {
                deduction_values
                    .get(&item.id)
                    .copied()
                    .or(item.default_value)
                    .map(sanitize)
                    .unwrap_or(Decimal::ZERO)
            })
            .sum();
        round_won(total)
    }

    /// Looks up the bracket and applies rate and progressive deduction.
    ///
    /// Returns the tax and the marginal rate that was applied.
    fn income_tax(
        &self,
        taxable_standard: Decimal,
    ) -> (Decimal, Decimal) {
        if taxable_standard <= Decimal::ZERO {
            return (Decimal::ZERO, Decimal::ZERO);
        }

        match find_bracket(self.tax_brackets, taxable_standard) {
            Some(bracket) => {
                let tax = taxable_standard * bracket.rate - bracket.progressive_deduction;
                (round_won(non_negative(tax)), bracket.rate)
            }
            None => (Decimal::ZERO, Decimal::ZERO),
        }
    }

    fn local_income_tax(
        &self,
        income_tax: Decimal,
    ) -> Decimal {
        round_won(income_tax * LOCAL_INCOME_TAX_RATE)
    }

    fn net_income(
        &self,
        gross_income: Decimal,
        income_tax: Decimal,
        local_income_tax: Decimal,
        social_insurance_total: Decimal,
    ) -> Decimal {
        non_negative(round_won(
            gross_income - income_tax - local_income_tax - social_insurance_total,
        ))
    }
}

/// Entered value for an item id: present and sane, else zero.
fn entered(
    values: &BTreeMap<String, Decimal>,
    item_id: &str,
) -> Decimal {
    values.get(item_id).copied().map(sanitize).unwrap_or(Decimal::ZERO)
}

/// Calculates net income with the statutory table and default rates.
pub fn calculate(
    income_items: &[IncomeItem],
    deduction_items: &[DeductionItem],
    income_values: &BTreeMap<String, Decimal>,
    deduction_values: &BTreeMap<String, Decimal>,
) -> CalculatedIncome {
    IncomeCalculator::default().calculate(
        income_items,
        deduction_items,
        income_values,
        deduction_values,
    )
}
