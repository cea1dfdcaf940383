use async_trait::async_trait;
use income_core::db::{DbConfig, IncomeRepository, RepositoryError, RepositoryFactory};
use tracing::info;

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`income_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use income_core::db::RepositoryRegistry;
/// use income_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"income.db"`. The file is created if it
    ///   does not exist.
    /// * A sqlx URL such as `"sqlite://income.db"`.
    /// * `":memory:"` for an ephemeral in-memory database.
    ///
    /// Migrations run on every open and the default catalog is written into
    /// collections that were never stored.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn IncomeRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.seed_defaults().await?;
        info!(connection = %config.connection_string, "opened sqlite store");
        Ok(Box::new(repo))
    }
}
