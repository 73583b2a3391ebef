//! In-memory storage backend.
//!
//! Documents live in a process-local table with one secondary index per
//! token key. The table and its indexes change together under a single write
//! lock, so a token is reachable by all of its keys or by none.
//!
//! There is no native TTL here: expired tokens are hidden from lookups as
//! soon as `expires_at` passes and are physically evicted by
//! [`spawn_expiry_sweeper`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::{DEFAULT_OPERATION_TIMEOUT, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::record::{TokenKey, TokenRecord};
use crate::storage::{ClientStore, TokenStore, within_budget};
use crate::types::{ClientInfo, TokenInfo};

// =============================================================================
// Token Table
// =============================================================================

#[derive(Debug, Default)]
struct TokenTable {
    records: HashMap<Uuid, TokenRecord>,
    /// Insertion-ordered ids per key value; keys are not unique.
    by_code: HashMap<String, Vec<Uuid>>,
    by_access: HashMap<String, Vec<Uuid>>,
    by_refresh: HashMap<String, Vec<Uuid>>,
}

impl TokenTable {
    fn index(&self, key: TokenKey) -> &HashMap<String, Vec<Uuid>> {
        match key {
            TokenKey::Code => &self.by_code,
            TokenKey::Access => &self.by_access,
            TokenKey::Refresh => &self.by_refresh,
        }
    }

    fn index_mut(&mut self, key: TokenKey) -> &mut HashMap<String, Vec<Uuid>> {
        match key {
            TokenKey::Code => &mut self.by_code,
            TokenKey::Access => &mut self.by_access,
            TokenKey::Refresh => &mut self.by_refresh,
        }
    }

    fn insert(&mut self, record: TokenRecord) -> Uuid {
        let id = Uuid::new_v4();
        for key in TokenKey::ALL {
            let value = record.key(key);
            if !value.is_empty() {
                self.index_mut(key)
                    .entry(value.to_string())
                    .or_default()
                    .push(id);
            }
        }
        self.records.insert(id, record);
        id
    }

    /// Id of the first live record reachable through `key`.
    fn find_id(&self, key: TokenKey, value: &str, now: OffsetDateTime) -> Option<Uuid> {
        self.index(key)
            .get(value)?
            .iter()
            .copied()
            .find(|id| {
                self.records
                    .get(id)
                    .is_some_and(|record| !record.is_expired_at(now))
            })
    }

    fn find(&self, key: TokenKey, value: &str, now: OffsetDateTime) -> Option<&TokenRecord> {
        self.find_id(key, value, now)
            .and_then(|id| self.records.get(&id))
    }

    /// Unlink a record from the table and every index.
    fn remove(&mut self, id: Uuid) -> Option<TokenRecord> {
        let record = self.records.remove(&id)?;
        for key in TokenKey::ALL {
            let value = record.key(key);
            if value.is_empty() {
                continue;
            }
            let index = self.index_mut(key);
            if let Some(ids) = index.get_mut(value) {
                ids.retain(|candidate| *candidate != id);
                if ids.is_empty() {
                    index.remove(value);
                }
            }
        }
        Some(record)
    }

    fn expired_ids(&self, now: OffsetDateTime) -> Vec<Uuid> {
        self.records
            .iter()
            .filter(|(_, record)| record.is_expired_at(now))
            .map(|(id, _)| *id)
            .collect()
    }
}

// =============================================================================
// In-Memory Token Store
// =============================================================================

/// Process-local [`TokenStore`].
///
/// Cloning is cheap and clones share the same table.
#[derive(Debug, Clone)]
pub struct InMemoryTokenStore {
    table: Arc<RwLock<TokenTable>>,
    budget: Duration,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_OPERATION_TIMEOUT)
    }

    #[must_use]
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            table: Arc::new(RwLock::new(TokenTable::default())),
            budget,
        }
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_budget(config.operation_timeout)
    }

    /// Number of stored records, expired or not.
    pub async fn len(&self) -> usize {
        self.table.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict every record whose `expires_at` has passed.
    ///
    /// Returns the number of records evicted.
    pub async fn purge_expired(&self) -> u64 {
        let now = OffsetDateTime::now_utc();
        let mut table = self.table.write().await;
        let mut evicted = 0;
        for id in table.expired_ids(now) {
            if table.remove(id).is_some() {
                evicted += 1;
            }
        }
        evicted
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn create(&self, token: &TokenInfo) -> StoreResult<()> {
        let record = TokenRecord::from_token(token)?;
        within_budget(self.budget, async {
            let id = self.table.write().await.insert(record);
            tracing::debug!(%id, "stored token");
            Ok(())
        })
        .await
    }

    async fn get_by(&self, key: TokenKey, value: &str) -> StoreResult<TokenInfo> {
        within_budget(self.budget, async {
            let now = OffsetDateTime::now_utc();
            let table = self.table.read().await;
            match table.find(key, value, now) {
                Some(record) => record.to_token(),
                None => Err(StoreError::not_found(format!("token with {key}"))),
            }
        })
        .await
    }

    async fn remove_by(&self, key: TokenKey, value: &str) -> StoreResult<()> {
        within_budget(self.budget, async {
            let now = OffsetDateTime::now_utc();
            let mut table = self.table.write().await;
            // Same record a lookup would return; expired leftovers are the sweeper's.
            if let Some(id) = table.find_id(key, value, now) {
                table.remove(id);
                tracing::debug!(%id, field = %key, "removed token");
            }
            Ok(())
        })
        .await
    }
}

/// Periodically evict expired tokens from `store`, every
/// `config.sweep_interval`.
///
/// The first sweep runs immediately. Abort the returned handle to stop.
///
/// # Errors
///
/// Returns `StoreError::InvalidInput` if the sweep interval is zero.
pub fn spawn_expiry_sweeper(
    store: InMemoryTokenStore,
    config: &StoreConfig,
) -> StoreResult<JoinHandle<()>> {
    let every = config.sweep_interval;
    if every.is_zero() {
        return Err(StoreError::invalid_input("sweep_interval must be > 0"));
    }

    tracing::debug!(?every, "starting expiry sweeper");
    Ok(tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;

            let evicted = store.purge_expired().await;
            if evicted > 0 {
                tracing::info!(evicted, "Evicted expired tokens");
            }
        }
    }))
}

// =============================================================================
// In-Memory Client Store
// =============================================================================

/// Process-local [`ClientStore`].
///
/// Keeps insertion order so duplicate `user_id`s resolve to the oldest
/// document, like a natural-order scan would.
#[derive(Debug, Clone)]
pub struct InMemoryClientStore {
    clients: Arc<RwLock<Vec<ClientInfo>>>,
    budget: Duration,
}

impl Default for InMemoryClientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClientStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_OPERATION_TIMEOUT)
    }

    #[must_use]
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            clients: Arc::new(RwLock::new(Vec::new())),
            budget,
        }
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_budget(config.operation_timeout)
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn set(&self, client: &ClientInfo) -> StoreResult<()> {
        let stored = client.clone().with_id(Uuid::new_v4().to_string());
        within_budget(self.budget, async {
            self.clients.write().await.push(stored);
            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, user_id: &str) -> StoreResult<ClientInfo> {
        within_budget(self.budget, async {
            self.clients
                .read()
                .await
                .iter()
                .find(|client| client.user_id == user_id)
                .cloned()
                .ok_or_else(|| StoreError::not_found(format!("client for user '{user_id}'")))
        })
        .await
    }

    async fn remove_by_id(&self, user_id: &str) -> StoreResult<()> {
        within_budget(self.budget, async {
            let mut clients = self.clients.write().await;
            if let Some(pos) = clients.iter().position(|client| client.user_id == user_id) {
                clients.remove(pos);
            }
            Ok(())
        })
        .await
    }
}
