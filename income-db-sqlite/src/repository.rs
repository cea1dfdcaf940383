use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use income_core::catalog::{default_deduction_items, default_income_items};
use income_core::{
    Collection, DeductionItem, IncomeGroup, IncomeItem, IncomeRepository, RepositoryError,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Income store backed by a single `store_entries` table.
///
/// Every [`Collection`] is one row whose `value` is the whole collection as
/// JSON.
pub struct SqliteRepository {
    pool: SqlitePool,
}

/// Turns a bare path or `:memory:` into a sqlx connection URL.
fn database_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" | "" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite://{path}"),
    }
}

impl SqliteRepository {
    /// Opens the database, creating the file if it does not exist.
    ///
    /// An in-memory database lives on a single pooled connection that is
    /// never recycled, so every query sees the same data.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let url = database_url(connection_string);
        let options = SqliteConnectOptions::from_str(&url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true);

        let pool_options = if url == "sqlite::memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", url))?;
        debug!(url = %url, "connected to sqlite");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Writes the default catalog into collections that were never written.
    ///
    /// Existing collections are left alone, including empty ones. Returns the
    /// number of collections seeded.
    pub async fn seed_defaults(&self) -> Result<usize, RepositoryError> {
        let mut seeded = 0;
        if self
            .insert_if_absent(Collection::IncomeItems, &default_income_items())
            .await?
        {
            seeded += 1;
        }
        if self
            .insert_if_absent(Collection::DeductionItems, &default_deduction_items())
            .await?
        {
            seeded += 1;
        }
        info!(seeded, "seeded default catalog");
        Ok(seeded)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn read_collection<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, RepositoryError> {
        let row: Option<StoreEntryRow> = sqlx::query_as(
            "SELECT value FROM store_entries WHERE key = ?",
        )
        .bind(collection.key())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        match row {
            Some(row) => serde_json::from_str(&row.value).map_err(|e| {
                RepositoryError::Serialization(format!("Failed to decode {}: {}", collection, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> Result<(), RepositoryError> {
        let value = encode(collection, items)?;

        sqlx::query(
            "INSERT INTO store_entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(collection.key())
        .bind(value)
        .bind(now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(collection = %collection, count = items.len(), "replaced collection");
        Ok(())
    }

    async fn insert_if_absent<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> Result<bool, RepositoryError> {
        let value = encode(collection, items)?;

        let result = sqlx::query(
            "INSERT INTO store_entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO NOTHING",
        )
        .bind(collection.key())
        .bind(value)
        .bind(now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct StoreEntryRow {
    value: String,
}

fn encode<T: Serialize>(
    collection: Collection,
    items: &[T],
) -> Result<String, RepositoryError> {
    serde_json::to_string(items).map_err(|e| {
        RepositoryError::Serialization(format!("Failed to encode {}: {}", collection, e))
    })
}

fn now() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[async_trait]
impl IncomeRepository for SqliteRepository {
    async fn list_income_items(&self) -> Result<Vec<IncomeItem>, RepositoryError> {
        let mut items: Vec<IncomeItem> = self.read_collection(Collection::IncomeItems).await?;
        items.sort_by_key(|item| item.order);
        Ok(items)
    }

    async fn replace_income_items(
        &self,
        items: &[IncomeItem],
    ) -> Result<(), RepositoryError> {
        self.write_collection(Collection::IncomeItems, items).await
    }

    async fn list_deduction_items(&self) -> Result<Vec<DeductionItem>, RepositoryError> {
        self.read_collection(Collection::DeductionItems).await
    }

    async fn replace_deduction_items(
        &self,
        items: &[DeductionItem],
    ) -> Result<(), RepositoryError> {
        self.write_collection(Collection::DeductionItems, items).await
    }

    async fn list_income_groups(&self) -> Result<Vec<IncomeGroup>, RepositoryError> {
        self.read_collection(Collection::IncomeGroups).await
    }

    async fn get_income_group(
        &self,
        id: &str,
    ) -> Result<IncomeGroup, RepositoryError> {
        self.list_income_groups()
            .await?
            .into_iter()
            .find(|group| group.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("income group '{}'", id)))
    }

    async fn replace_income_groups(
        &self,
        groups: &[IncomeGroup],
    ) -> Result<(), RepositoryError> {
        self.write_collection(Collection::IncomeGroups, groups).await
    }

    async fn last_modified(
        &self,
        collection: Collection,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT updated_at FROM store_entries WHERE key = ?")
                .bind(collection.key())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(|(updated_at,)| parse_datetime(&updated_at)).transpose()
    }
}
