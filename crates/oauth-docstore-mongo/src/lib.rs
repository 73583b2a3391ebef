//! MongoDB storage backend for oauth-docstore
//!
//! Provides persistent storage for:
//!
//! - OAuth clients (`oauth_client` collection, keyed by `user_id`)
//! - Tokens (`oauth_token` collection, keyed by `access_id`, `code_id`
//!   and `refresh_id`, evicted by a TTL index on `expired_at`)
//!
//! The database handle is injected; [`MongoAuthStorage::connect`] is a thin
//! convenience for callers that have only a connection string.
//!
//! # Example
//!
//! ```ignore
//! use oauth_docstore::{StoreConfig, TokenStore};
//! use oauth_docstore_mongo::MongoAuthStorage;
//!
//! let storage = MongoAuthStorage::new(client.database("oauth"), StoreConfig::default());
//! let tokens = storage.tokens();
//! let token = tokens.get_by_refresh("R1").await?;
//! ```

pub mod client;
pub mod token;

use std::time::Duration;

use mongodb::{Client, Database};

use oauth_docstore::{StoreConfig, StoreError, StoreResult};

pub use client::{ClientDocument, MongoClientStore};
pub use token::{MongoTokenStore, TokenDocument};

/// MongoDB storage backend for OAuth data.
///
/// Holds one database handle and hands out stores bound to the configured
/// collections.
#[derive(Debug, Clone)]
pub struct MongoAuthStorage {
    database: Database,
    config: StoreConfig,
}

impl MongoAuthStorage {
    /// Create storage over an existing database handle.
    #[must_use]
    pub fn new(database: Database, config: StoreConfig) -> Self {
        Self { database, config }
    }

    /// Connect using `config.uri` and select `config.database`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(StoreError::backend)?;
        let database = client.database(&config.database);
        tracing::info!(database = %config.database, "MongoDB auth storage ready");
        Ok(Self::new(database, config))
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Storage Accessors
    // -------------------------------------------------------------------------

    /// Get token storage operations.
    #[must_use]
    pub fn tokens(&self) -> MongoTokenStore {
        MongoTokenStore::new(&self.database, &self.config)
    }

    /// Get client storage operations.
    #[must_use]
    pub fn clients(&self) -> MongoClientStore {
        MongoClientStore::new(&self.database, &self.config)
    }

    /// Provision token indexes ahead of the first insert.
    ///
    /// # Errors
    ///
    /// See [`MongoTokenStore::ensure_indexes`].
    pub async fn ensure_indexes(&self, access_lifetime: Duration) -> StoreResult<()> {
        self.tokens().ensure_indexes(access_lifetime).await
    }
}
