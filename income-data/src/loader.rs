use std::collections::HashSet;
use std::io::Read;

use income_core::calculations::validate_brackets;
use income_core::{
    CalculatorError, DeductionItem, IncomeItem, IncomeKind, IncomeRepository, RepositoryError,
    TaxBracket,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading income or deduction item definitions.
#[derive(Debug, Error)]
pub enum ItemLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Duplicate item id '{0}'")]
    DuplicateId(String),

    #[error("Item '{id}' has unknown kind '{kind}' (expected taxable or tax_exempt)")]
    UnknownKind { id: String, kind: String },

    #[error("Item '{id}' has negative {field}: {amount}")]
    NegativeAmount {
        id: String,
        field: &'static str,
        amount: Decimal,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ItemLoaderError {
    fn from(err: csv::Error) -> Self {
        ItemLoaderError::CsvParse(err.to_string())
    }
}

/// Errors that can occur when loading a tax bracket table.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid bracket table: {0}")]
    InvalidTable(#[from] CalculatorError),
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the income items CSV file.
///
/// - `id`: Stable item id, referenced by entered values
/// - `name`: Display name
/// - `kind`: `taxable` or `tax_exempt`
/// - `category`: Free-form grouping label
/// - `monthly_limit`: Monthly cap for tax-exempt items (empty for none)
/// - `order`: Display order
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IncomeItemRecord {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub category: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub monthly_limit: Option<Decimal>,
    #[serde(default)]
    pub order: i32,
}

/// A single record from the deduction items CSV file.
///
/// `default_value` is used when a person has not entered the deduction;
/// leave it empty for no default.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeductionItemRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub default_value: Option<Decimal>,
}

/// A single record from the tax brackets CSV file.
///
/// `max` is empty for the open-ended top bracket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub min: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub progressive_deduction: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn check_unique<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), ItemLoaderError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ItemLoaderError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

fn check_non_negative(
    id: &str,
    field: &'static str,
    amount: Option<Decimal>,
) -> Result<(), ItemLoaderError> {
    match amount {
        Some(amount) if amount < Decimal::ZERO => Err(ItemLoaderError::NegativeAmount {
            id: id.to_string(),
            field,
            amount,
        }),
        _ => Ok(()),
    }
}

impl TryFrom<IncomeItemRecord> for IncomeItem {
    type Error = ItemLoaderError;

    fn try_from(record: IncomeItemRecord) -> Result<Self, Self::Error> {
        let kind = IncomeKind::parse(&record.kind).ok_or_else(|| ItemLoaderError::UnknownKind {
            id: record.id.clone(),
            kind: record.kind.clone(),
        })?;
        check_non_negative(&record.id, "monthly_limit", record.monthly_limit)?;

        Ok(IncomeItem {
            id: record.id,
            name: record.name,
            kind,
            category: record.category,
            monthly_limit: record.monthly_limit,
            order: record.order,
        })
    }
}

impl TryFrom<DeductionItemRecord> for DeductionItem {
    type Error = ItemLoaderError;

    fn try_from(record: DeductionItemRecord) -> Result<Self, Self::Error> {
        check_non_negative(&record.id, "default_value", record.default_value)?;

        Ok(DeductionItem {
            id: record.id,
            name: record.name,
            category: record.category,
            default_value: record.default_value,
        })
    }
}

/// Loader for income and deduction item definitions from CSV files.
///
/// Parsed lists are written through the [`IncomeRepository`] trait, so the
/// loader works with any backend. Loading replaces the stored collection.
pub struct ItemLoader;

impl ItemLoader {
    /// Parse and validate income items, sorted by `order`.
    pub fn parse_income_items<R: Read>(reader: R) -> Result<Vec<IncomeItem>, ItemLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut items = Vec::new();

        for result in csv_reader.deserialize() {
            let record: IncomeItemRecord = result?;
            items.push(IncomeItem::try_from(record)?);
        }

        check_unique(items.iter().map(|item| item.id.as_str()))?;
        items.sort_by_key(|item| item.order);
        Ok(items)
    }

    /// Parse and validate deduction items, keeping file order.
    pub fn parse_deduction_items<R: Read>(
        reader: R
    ) -> Result<Vec<DeductionItem>, ItemLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut items = Vec::new();

        for result in csv_reader.deserialize() {
            let record: DeductionItemRecord = result?;
            items.push(DeductionItem::try_from(record)?);
        }

        check_unique(items.iter().map(|item| item.id.as_str()))?;
        Ok(items)
    }

    /// Replace the stored income items. Returns the number written.
    ///
    /// Running the same load twice produces the same result.
    pub async fn load_income_items<R: IncomeRepository + ?Sized>(
        repo: &R,
        items: &[IncomeItem],
    ) -> Result<usize, ItemLoaderError> {
        repo.replace_income_items(items).await?;
        info!(count = items.len(), "loaded income items");
        Ok(items.len())
    }

    /// Replace the stored deduction items. Returns the number written.
    pub async fn load_deduction_items<R: IncomeRepository + ?Sized>(
        repo: &R,
        items: &[DeductionItem],
    ) -> Result<usize, ItemLoaderError> {
        repo.replace_deduction_items(items).await?;
        info!(count = items.len(), "loaded deduction items");
        Ok(items.len())
    }
}

/// Loader for progressive tax bracket tables.
pub struct BracketLoader;

impl BracketLoader {
    /// Parse a bracket table and check that it partitions the taxable range.
    ///
    /// Rows may appear in any order; they are sorted by `min` before
    /// validation.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracket>, BracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut brackets = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            brackets.push(TaxBracket {
                min: record.min,
                max: record.max,
                rate: record.rate,
                progressive_deduction: record.progressive_deduction,
            });
        }

        brackets.sort_by(|a, b| a.min.cmp(&b.min));
        validate_brackets(&brackets)?;
        Ok(brackets)
    }
}
