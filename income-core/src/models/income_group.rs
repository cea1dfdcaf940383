use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::deserialize_amount_map;

/// Entered values for one person, keyed by item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIncomeInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_amount_map")]
    pub income_values: BTreeMap<String, Decimal>,
    #[serde(default, deserialize_with = "deserialize_amount_map")]
    pub deduction_values: BTreeMap<String, Decimal>,
}

impl PersonIncomeInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for an income value.
    pub fn with_income(
        mut self,
        item_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        self.income_values.insert(item_id.into(), amount);
        self
    }

    /// Builder-style setter for a deduction value.
    pub fn with_deduction(
        mut self,
        item_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        self.deduction_values.insert(item_id.into(), amount);
        self
    }
}

/// A household of two people whose incomes are planned together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub people: [PersonIncomeInput; 2],
}
