use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{DeductionItem, IncomeGroup, IncomeItem};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A stored collection. Each one lives under a single key as one blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    IncomeItems,
    DeductionItems,
    IncomeGroups,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::IncomeItems,
        Collection::DeductionItems,
        Collection::IncomeGroups,
    ];

    /// Storage key of the collection.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::IncomeItems => "income_items",
            Collection::DeductionItems => "deduction_items",
            Collection::IncomeGroups => "income_groups",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whole-collection persistence for income items, deduction items and groups.
///
/// A `replace_*` call overwrites the stored collection in one write, so
/// concurrent writers resolve last-write-wins. Listing a collection that was
/// never written yields an empty list.
#[async_trait]
pub trait IncomeRepository: Send + Sync {
    // Income items
    async fn list_income_items(&self) -> Result<Vec<IncomeItem>, RepositoryError>;
    async fn replace_income_items(
        &self,
        items: &[IncomeItem],
    ) -> Result<(), RepositoryError>;

    // Deduction items
    async fn list_deduction_items(&self) -> Result<Vec<DeductionItem>, RepositoryError>;
    async fn replace_deduction_items(
        &self,
        items: &[DeductionItem],
    ) -> Result<(), RepositoryError>;

    // Income groups
    async fn list_income_groups(&self) -> Result<Vec<IncomeGroup>, RepositoryError>;
    async fn get_income_group(
        &self,
        id: &str,
    ) -> Result<IncomeGroup, RepositoryError>;
    async fn replace_income_groups(
        &self,
        groups: &[IncomeGroup],
    ) -> Result<(), RepositoryError>;

    /// When the collection was last replaced, if ever.
    async fn last_modified(
        &self,
        collection: Collection,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError>;
}
