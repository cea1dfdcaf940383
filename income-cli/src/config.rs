//! `income-calc` configuration.
//!
//! Settings come from a TOML file and are then overridden by command line
//! flags:
//!
//! ```toml
//! log_level = "debug"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "income.db"
//! ```
//!
//! Every key is optional. Without a file the defaults apply.

use std::fs;
use std::path::{Path, PathBuf};

use income_core::DbConfig;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// File read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "income-calc.toml";

/// Store opened when neither the file nor the command line names one.
pub const DEFAULT_DATABASE: &str = "income.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("database backend must not be empty")]
    EmptyBackend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// A bare level or any `EnvFilter` directive.
    pub log_level: String,
    #[serde(deserialize_with = "deserialize_database")]
    pub database: DbConfig,
}

/// `[database]` as written in the file; each key may be left out.
#[derive(Deserialize)]
struct DatabaseTable {
    backend: Option<String>,
    connection_string: Option<String>,
}

/// Fills keys missing from `[database]` with the on-disk defaults, so a
/// table naming only the backend still opens a file store.
fn deserialize_database<'de, D>(deserializer: D) -> Result<DbConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let table = DatabaseTable::deserialize(deserializer)?;
    let defaults = AppConfig::default().database;
    Ok(DbConfig {
        backend: table.backend.unwrap_or(defaults.backend),
        connection_string: table
            .connection_string
            .unwrap_or(defaults.connection_string),
    })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            database: DbConfig::sqlite(DEFAULT_DATABASE),
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub backend: Option<String>,
    pub connection_string: Option<String>,
}

impl AppConfig {
    /// Loads configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// no path is given and that file exists.
    ///
    /// # Errors
    ///
    /// An explicitly named file must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies command line values over the loaded ones.
    pub fn with_overrides(
        mut self,
        overrides: ConfigOverrides,
    ) -> Self {
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(backend) = overrides.backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = overrides.connection_string {
            self.database.connection_string = connection_string;
        }
        self
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the log level is not a valid filter
    /// directive or the backend name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        if self.database.backend.trim().is_empty() {
            return Err(ConfigError::EmptyBackend);
        }
        Ok(())
    }
}
