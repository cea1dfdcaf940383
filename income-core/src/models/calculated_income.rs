use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five payroll contributions, each rounded to whole won.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialInsurance {
    pub national_pension: Decimal,
    pub health_insurance: Decimal,
    pub long_term_care: Decimal,
    pub employment_insurance: Decimal,
    pub workers_compensation: Decimal,
    pub total: Decimal,
}

/// Result of running the income calculator for one person.
///
/// All amounts are annual whole won unless the field name says monthly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedIncome {
    pub taxable_income_total: Decimal,
    pub tax_exempt_income_total: Decimal,
    pub gross_income: Decimal,
    pub employment_income_deduction: Decimal,
    pub taxable_income_after_deduction: Decimal,
    pub total_deductions: Decimal,
    pub taxable_standard: Decimal,
    /// Marginal rate of the bracket the taxable standard fell into.
    pub marginal_rate: Decimal,
    pub income_tax: Decimal,
    pub local_income_tax: Decimal,
    pub social_insurance: SocialInsurance,
    pub net_income: Decimal,
    pub monthly_net_income: Decimal,
}

impl CalculatedIncome {
    /// Income tax plus local income tax.
    pub fn total_tax(&self) -> Decimal {
        self.income_tax + self.local_income_tax
    }
}

/// Combined result for an [`IncomeGroup`](super::IncomeGroup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCalculation {
    pub group_id: String,
    pub group_name: String,
    /// Names as entered, in the same order as `people`.
    #[serde(default)]
    pub person_names: [String; 2],
    pub people: [CalculatedIncome; 2],
    pub combined_gross_income: Decimal,
    pub combined_net_income: Decimal,
    pub combined_monthly_net_income: Decimal,
}
