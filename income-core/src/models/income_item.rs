use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether an income line is part of the progressive tax base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeKind {
    Taxable,
    TaxExempt,
}

impl IncomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taxable => "taxable",
            Self::TaxExempt => "tax_exempt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "taxable" => Some(Self::Taxable),
            "tax_exempt" | "tax-exempt" | "exempt" => Some(Self::TaxExempt),
            _ => None,
        }
    }
}

/// One configurable income line, e.g. base salary or meal allowance.
///
/// Values entered against a taxable item are annual amounts. Values entered
/// against a tax-exempt item are monthly amounts, capped by `monthly_limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeItem {
    pub id: String,
    pub name: String,
    pub kind: IncomeKind,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<Decimal>,
    #[serde(default)]
    pub order: i32,
}

impl IncomeItem {
    pub fn is_taxable(&self) -> bool {
        self.kind == IncomeKind::Taxable
    }
}
