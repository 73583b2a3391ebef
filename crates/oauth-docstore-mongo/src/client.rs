//! OAuth client storage.
//!
//! Clients are keyed by the owning `user_id`, not by `_id`. `set` always
//! inserts, so several documents may share a `user_id`; lookups and deletes
//! act on the first match.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use oauth_docstore::{ClientInfo, ClientStore, StoreConfig, StoreError, StoreResult, within_budget};

/// Field used for every client lookup.
pub const USER_ID_FIELD: &str = "user_id";

/// Client document as stored in the client collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub secret: String,
    pub domain: String,
    pub user_id: String,
}

impl From<&ClientInfo> for ClientDocument {
    /// The caller's `id` is ignored; the database assigns one on insert.
    fn from(client: &ClientInfo) -> Self {
        Self {
            id: None,
            secret: client.secret.clone(),
            domain: client.domain.clone(),
            user_id: client.user_id.clone(),
        }
    }
}

impl From<ClientDocument> for ClientInfo {
    fn from(document: ClientDocument) -> Self {
        Self {
            id: document.id.map(|id| id.to_hex()),
            secret: document.secret,
            domain: document.domain,
            user_id: document.user_id,
        }
    }
}

fn user_filter(user_id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(USER_ID_FIELD, user_id);
    filter
}

/// MongoDB [`ClientStore`].
#[derive(Debug, Clone)]
pub struct MongoClientStore {
    collection: Collection<ClientDocument>,
    budget: Duration,
}

impl MongoClientStore {
    /// Bind to the configured client collection of `database`.
    #[must_use]
    pub fn new(database: &Database, config: &StoreConfig) -> Self {
        Self {
            collection: database.collection(&config.client_collection),
            budget: config.operation_timeout,
        }
    }

    #[must_use]
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    async fn insert(&self, document: ClientDocument) -> StoreResult<()> {
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(StoreError::backend)?;
        tracing::debug!(
            collection = %self.collection.name(),
            id = %result.inserted_id,
            "stored client"
        );
        Ok(())
    }

    async fn find(&self, user_id: &str) -> StoreResult<ClientInfo> {
        self.collection
            .find_one(user_filter(user_id))
            .await
            .map_err(StoreError::backend)?
            .map(ClientInfo::from)
            .ok_or_else(|| StoreError::not_found(format!("client for user '{user_id}'")))
    }

    async fn delete(&self, user_id: &str) -> StoreResult<()> {
        let result = self
            .collection
            .delete_one(user_filter(user_id))
            .await
            .map_err(StoreError::backend)?;
        tracing::debug!(
            collection = %self.collection.name(),
            deleted = result.deleted_count,
            "removed client"
        );
        Ok(())
    }
}

#[async_trait]
impl ClientStore for MongoClientStore {
    async fn set(&self, client: &ClientInfo) -> StoreResult<()> {
        within_budget(self.budget, self.insert(ClientDocument::from(client))).await
    }

    async fn get_by_id(&self, user_id: &str) -> StoreResult<ClientInfo> {
        within_budget(self.budget, self.find(user_id)).await
    }

    async fn remove_by_id(&self, user_id: &str) -> StoreResult<()> {
        within_budget(self.budget, self.delete(user_id)).await
    }
}
