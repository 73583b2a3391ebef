//! Token storage.
//!
//! One document per token issuance, reachable through `access_id`,
//! `code_id` and `refresh_id`. Eviction is delegated to a MongoDB TTL index
//! on `expired_at`.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{Binary, DateTime, Document, oid::ObjectId};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use oauth_docstore::{
    StoreConfig, StoreError, StoreResult, TokenInfo, TokenKey, TokenRecord, TokenStore,
    within_budget,
};

/// Field carrying the eviction instant.
pub const EXPIRES_AT_FIELD: &str = "expired_at";

/// Server codes for an index that already exists with other options.
const INDEX_CONFLICT_CODES: [i32; 2] = [85, 86];

// =============================================================================
// Types
// =============================================================================

/// Token document as stored in the token collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub access_id: String,
    pub code_id: String,
    pub refresh_id: String,
    /// JSON payload of the full token.
    pub data: Binary,
    pub expired_at: DateTime,
    pub expired_at_refresh: DateTime,
}

impl TokenDocument {
    /// Map a record to its stored form.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if a timestamp cannot be represented.
    pub fn from_record(record: &TokenRecord) -> StoreResult<Self> {
        Ok(Self {
            id: None,
            access_id: record.access_key.clone(),
            code_id: record.code_key.clone(),
            refresh_id: record.refresh_key.clone(),
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes: record.payload.clone(),
            },
            expired_at: to_bson_datetime(record.expires_at)?,
            expired_at_refresh: to_bson_datetime(record.refresh_expires_at)?,
        })
    }

    /// Decode the stored payload.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload is corrupt.
    pub fn to_token(&self) -> StoreResult<TokenInfo> {
        TokenRecord::decode_payload(&self.data.bytes)
    }
}

fn to_bson_datetime(at: OffsetDateTime) -> StoreResult<DateTime> {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000)
        .map(DateTime::from_millis)
        .map_err(|_| StoreError::encoding(format!("timestamp {at} is out of range")))
}

fn key_filter(key: TokenKey, value: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(key.field(), value);
    filter
}

fn ascending(field: &str) -> Document {
    let mut keys = Document::new();
    keys.insert(field, 1_i32);
    keys
}

fn access_index() -> IndexModel {
    IndexModel::builder()
        .keys(ascending(TokenKey::Access.field()))
        .build()
}

fn expiry_index(ttl: Duration) -> IndexModel {
    IndexModel::builder()
        .keys(ascending(EXPIRES_AT_FIELD))
        .options(IndexOptions::builder().expire_after(ttl).build())
        .build()
}

fn is_index_conflict(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(cmd) if INDEX_CONFLICT_CODES.contains(&cmd.code)
    )
}

// =============================================================================
// Token Storage
// =============================================================================

/// MongoDB [`TokenStore`].
#[derive(Debug, Clone)]
pub struct MongoTokenStore {
    collection: Collection<TokenDocument>,
    budget: Duration,
}

impl MongoTokenStore {
    /// Bind to the configured token collection of `database`.
    #[must_use]
    pub fn new(database: &Database, config: &StoreConfig) -> Self {
        Self {
            collection: database.collection(&config.token_collection),
            budget: config.operation_timeout,
        }
    }

    #[must_use]
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// Ensure the access-key index and the TTL index exist.
    ///
    /// Safe to call repeatedly. If a TTL index already exists with a
    /// different window, the existing one is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if index creation fails or times out.
    pub async fn ensure_indexes(&self, ttl: Duration) -> StoreResult<()> {
        within_budget(self.budget, self.provision_indexes(ttl)).await
    }

    #[tracing::instrument(skip_all, fields(collection = %self.collection.name(), ttl_secs = ttl.as_secs()))]
    async fn provision_indexes(&self, ttl: Duration) -> StoreResult<()> {
        self.collection
            .create_index(access_index())
            .await
            .map_err(StoreError::backend)?;

        match self.collection.create_index(expiry_index(ttl)).await {
            Ok(_) => Ok(()),
            Err(e) if is_index_conflict(&e) => {
                tracing::warn!(error = %e, "TTL index exists with another window; keeping it");
                Ok(())
            }
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    #[tracing::instrument(skip_all, fields(collection = %self.collection.name()))]
    async fn insert(&self, document: TokenDocument, ttl: Duration) -> StoreResult<()> {
        self.provision_indexes(ttl).await?;
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(StoreError::backend)?;
        tracing::debug!(id = %result.inserted_id, "stored token");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(collection = %self.collection.name(), field = %key))]
    async fn find(&self, key: TokenKey, value: &str) -> StoreResult<TokenInfo> {
        if value.is_empty() {
            return Err(StoreError::not_found(format!("token with empty {key}")));
        }

        let document = self
            .collection
            .find_one(key_filter(key, value))
            .await
            .map_err(StoreError::backend)?;

        match document {
            Some(document) => document.to_token(),
            None => Err(StoreError::not_found(format!("token with {key}"))),
        }
    }

    #[tracing::instrument(skip_all, fields(collection = %self.collection.name(), field = %key))]
    async fn delete(&self, key: TokenKey, value: &str) -> StoreResult<()> {
        if value.is_empty() {
            return Ok(());
        }

        let result = self
            .collection
            .delete_one(key_filter(key, value))
            .await
            .map_err(StoreError::backend)?;
        tracing::debug!(deleted = result.deleted_count, "removed token");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MongoTokenStore {
    async fn create(&self, token: &TokenInfo) -> StoreResult<()> {
        let record = TokenRecord::from_token(token)?;
        let document = TokenDocument::from_record(&record)?;
        within_budget(self.budget, self.insert(document, record.ttl)).await
    }

    async fn get_by(&self, key: TokenKey, value: &str) -> StoreResult<TokenInfo> {
        within_budget(self.budget, self.find(key, value)).await
    }

    async fn remove_by(&self, key: TokenKey, value: &str) -> StoreResult<()> {
        within_budget(self.budget, self.delete(key, value)).await
    }
}
