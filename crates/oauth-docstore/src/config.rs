//! Store configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! uri = "mongodb://127.0.0.1:27017"
//! database = "oauth"
//! token_collection = "oauth_token"
//! client_collection = "oauth_client"
//! operation_timeout = "5s"
//! sweep_interval = "1m"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default collection holding token documents.
pub const DEFAULT_TOKEN_COLLECTION: &str = "oauth_token";
/// Default collection holding client documents.
pub const DEFAULT_CLIENT_COLLECTION: &str = "oauth_client";
/// Default per-operation budget.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection and layout settings shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection string, used only when the store opens its own connection.
    pub uri: String,

    /// Logical database holding both collections.
    pub database: String,

    pub token_collection: String,
    pub client_collection: String,

    /// Wall-clock budget for a single store operation.
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,

    /// How often the in-memory backend evicts expired tokens.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://127.0.0.1:27017".to_string(),
            database: "oauth".to_string(),
            token_collection: DEFAULT_TOKEN_COLLECTION.to_string(),
            client_collection: DEFAULT_CLIENT_COLLECTION.to_string(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration sources could not be read or merged.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl StoreConfig {
    /// Config with a different database name.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The database or a collection name is empty
    /// - Both collections share a name
    /// - The operation timeout or sweep interval is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::InvalidValue(
                "database cannot be empty".to_string(),
            ));
        }

        if self.token_collection.is_empty() || self.client_collection.is_empty() {
            return Err(ConfigError::InvalidValue(
                "collection names cannot be empty".to_string(),
            ));
        }

        if self.token_collection == self.client_collection {
            return Err(ConfigError::InvalidValue(format!(
                "token and client collections must differ (both are '{}')",
                self.token_collection
            )));
        }

        if self.operation_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "operation_timeout must be > 0".to_string(),
            ));
        }

        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "sweep_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

pub mod loader {
    use super::{ConfigError, StoreConfig};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// File read when no explicit path is given.
    pub const DEFAULT_CONFIG_FILE: &str = "oauth-docstore.toml";
    /// Prefix for environment overrides, e.g. `OAUTH_DOCSTORE__DATABASE=auth`.
    pub const ENV_PREFIX: &str = "OAUTH_DOCSTORE";

    /// Load configuration from an optional TOML file plus environment overrides.
    ///
    /// A missing default file is not an error; defaults fill every unset
    /// field. An explicit `path` must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the merged result
    /// fails validation.
    pub fn load_config(path: Option<&str>) -> Result<StoreConfig, ConfigError> {
        let mut builder = Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(File::from(PathBuf::from(path)).required(true));
            }
            None => {
                let pathbuf = PathBuf::from(DEFAULT_CONFIG_FILE);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let merged: StoreConfig = builder.build()?.try_deserialize()?;
        merged.validate()?;
        Ok(merged)
    }
}
