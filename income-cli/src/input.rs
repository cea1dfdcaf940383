//! Calculation input files for `income-calc calculate`.
//!
//! A file holds one person's entered values and, optionally, the item
//! definitions to use. Omitted item lists fall back to the default catalog.
//!
//! ```toml
//! [person]
//! name = "Kim"
//!
//! [person.income_values]
//! base_salary = 30000000
//! meal_allowance = "200,000"
//!
//! [person.deduction_values]
//! dependents = 1500000
//! ```
//!
//! The same shape is accepted as JSON when the file ends in `.json`.

use std::fs;
use std::path::{Path, PathBuf};

use income_core::catalog::{default_deduction_items, default_income_items};
use income_core::{DeductionItem, IncomeItem, PersonIncomeInput};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read input file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationInput {
    pub income_items: Option<Vec<IncomeItem>>,
    pub deduction_items: Option<Vec<DeductionItem>>,
    pub person: PersonIncomeInput,
}

impl CalculationInput {
    /// Reads a TOML or JSON input file, chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let input: Self = if is_json {
            serde_json::from_str(&text).map_err(|source| InputError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            toml::from_str(&text).map_err(|source| InputError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        };

        debug!(
            path = %path.display(),
            income_values = input.person.income_values.len(),
            deduction_values = input.person.deduction_values.len(),
            "read calculation input"
        );
        Ok(input)
    }

    /// Sets entered values from the command line over those from the file.
    pub fn with_entries(
        mut self,
        income: impl IntoIterator<Item = (String, Decimal)>,
        deductions: impl IntoIterator<Item = (String, Decimal)>,
    ) -> Self {
        self.person.income_values.extend(income);
        self.person.deduction_values.extend(deductions);
        self
    }

    /// Item lists to calculate with: the file's own, else the catalog.
    pub fn items(&self) -> (Vec<IncomeItem>, Vec<DeductionItem>) {
        let income_items = self
            .income_items
            .clone()
            .unwrap_or_else(default_income_items);
        let deduction_items = self
            .deduction_items
            .clone()
            .unwrap_or_else(default_deduction_items);
        (income_items, deduction_items)
    }
}
