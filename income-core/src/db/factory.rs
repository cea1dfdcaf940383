use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repository::{IncomeRepository, RepositoryError};

const IN_MEMORY: &str = ":memory:";

/// Which store to open.
///
/// `backend` selects a registered [`RepositoryFactory`]; `connection_string`
/// is handed to it as-is. For `sqlite` that is a file path such as
/// `income.db`, a `sqlite://` URL, or `:memory:`.
///
/// Missing fields in a config file take the [`Default`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl DbConfig {
    /// SQLite store at `path`.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: path.into(),
        }
    }

    /// Throwaway SQLite store, gone when the repository is dropped.
    pub fn in_memory() -> Self {
        Self::sqlite(IN_MEMORY)
    }

    pub fn is_in_memory(&self) -> bool {
        self.connection_string == IN_MEMORY
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Opens stores of one backend. A backend crate exports one of these and the
/// binary registers it at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Returns a migrated repository with the default catalog seeded.
    async fn create(&self, config: &DbConfig) -> Result<Box<dyn IncomeRepository>, RepositoryError>;
}

/// Backend factories by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`, replacing any earlier one with the same name.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] when `config.backend` is not
    /// registered; otherwise whatever the factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn IncomeRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}' (registered: {})",
                config.backend,
                self.backends().join(", ")
            )));
        };

        debug!(
            backend = %config.backend,
            in_memory = config.is_in_memory(),
            "opening income store"
        );
        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::Collection;
    use crate::models::{DeductionItem, IncomeGroup, IncomeItem};

    struct EmptyStore;

    #[async_trait]
    impl IncomeRepository for EmptyStore {
        async fn list_income_items(&self) -> Result<Vec<IncomeItem>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn replace_income_items(
            &self,
            _items: &[IncomeItem],
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn list_deduction_items(&self) -> Result<Vec<DeductionItem>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn replace_deduction_items(
            &self,
            _items: &[DeductionItem],
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn list_income_groups(&self) -> Result<Vec<IncomeGroup>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn get_income_group(
            &self,
            id: &str,
        ) -> Result<IncomeGroup, RepositoryError> {
            Err(RepositoryError::NotFound(id.to_string()))
        }
        async fn replace_income_groups(
            &self,
            _groups: &[IncomeGroup],
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn last_modified(
            &self,
            _collection: Collection,
        ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
            Ok(None)
        }
    }

    /// Records the connection strings it was asked to open.
    struct RecordingFactory {
        name: &'static str,
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingFactory {
        fn boxed(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<Mutex<Vec<String>>>) {
            let opened = Arc::new(Mutex::new(Vec::new()));
            let factory = Self {
                name,
                opened: opened.clone(),
            };
            (Box::new(factory), opened)
        }
    }

    #[async_trait]
    impl RepositoryFactory for RecordingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            config: &DbConfig,
        ) -> Result<Box<dyn IncomeRepository>, RepositoryError> {
            self.opened
                .lock()
                .unwrap()
                .push(config.connection_string.clone());
            Ok(Box::new(EmptyStore))
        }
    }

    struct UnreachableFactory;

    #[async_trait]
    impl RepositoryFactory for UnreachableFactory {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn IncomeRepository>, RepositoryError> {
            Err(RepositoryError::Connection("store offline".to_string()))
        }
    }

    #[test]
    fn default_config_is_in_memory_sqlite() {
        let config = DbConfig::default();

        assert_eq!(config, DbConfig::sqlite(":memory:"));
        assert!(config.is_in_memory());
        assert!(!DbConfig::sqlite("income.db").is_in_memory());
    }

    #[test]
    fn config_fields_default_independently() {
        let config: DbConfig = serde_json::from_str(r#"{"connection_string":"income.db"}"#).unwrap();

        assert_eq!(config, DbConfig::sqlite("income.db"));
    }

    #[test]
    fn backends_are_listed_by_name() {
        let mut registry = RepositoryRegistry::new();
        assert!(registry.backends().is_empty());

        registry.register(RecordingFactory::boxed("sqlite").0);
        registry.register(RecordingFactory::boxed("postgres").0);
        registry.register(RecordingFactory::boxed("sqlite").0);

        assert_eq!(registry.backends(), vec!["postgres", "sqlite"]);
    }

    #[tokio::test]
    async fn create_forwards_config_to_matching_backend() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, sqlite_opened) = RecordingFactory::boxed("sqlite");
        let (postgres, postgres_opened) = RecordingFactory::boxed("postgres");
        registry.register(sqlite);
        registry.register(postgres);

        let repo = registry
            .create(&DbConfig::sqlite("household.db"))
            .await
            .unwrap();

        assert_eq!(*sqlite_opened.lock().unwrap(), vec!["household.db".to_string()]);
        assert!(postgres_opened.lock().unwrap().is_empty());
        assert!(repo.list_income_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_backend_is_a_configuration_error() {
        let mut registry = RepositoryRegistry::new();
        registry.register(RecordingFactory::boxed("sqlite").0);
        let config = DbConfig {
            backend: "postgres".to_string(),
            ..DbConfig::default()
        };

        let Err(RepositoryError::Configuration(msg)) = registry.create(&config).await else {
            panic!("expected a configuration error");
        };

        assert_eq!(msg, "unknown backend 'postgres' (registered: sqlite)");
    }

    #[tokio::test]
    async fn factory_errors_pass_through() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(UnreachableFactory));
        let config = DbConfig {
            backend: "unreachable".to_string(),
            ..DbConfig::default()
        };

        let result = registry.create(&config).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Connection(msg)) if msg == "store offline"
        ));
    }
}
