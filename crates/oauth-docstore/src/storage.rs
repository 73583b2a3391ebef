//! Storage traits for OAuth clients and tokens.
//!
//! # Implementations
//!
//! - [`crate::memory`] - in-process backend with an expiry sweeper
//! - `oauth-docstore-mongo` - MongoDB backend with native TTL indexes

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::record::TokenKey;
use crate::types::{ClientInfo, TokenInfo};

// =============================================================================
// Client Storage Trait
// =============================================================================

/// Storage operations for OAuth clients, keyed by owning user.
///
/// # Example
///
/// ```ignore
/// use oauth_docstore::{ClientInfo, ClientStore};
///
/// async fn example(store: &impl ClientStore) -> oauth_docstore::StoreResult<()> {
///     store.set(&ClientInfo::new("user-1", "s3cret", "https://app.example")).await?;
///     let client = store.get_by_id("user-1").await?;
///     assert_eq!(client.domain, "https://app.example");
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Insert a new client document.
    ///
    /// Does not check for an existing document with the same `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn set(&self, client: &ClientInfo) -> StoreResult<()>;

    /// Find the client owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no document matches, or a storage error.
    async fn get_by_id(&self, user_id: &str) -> StoreResult<ClientInfo>;

    /// Delete the client owned by `user_id`.
    ///
    /// Deleting an absent client succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn remove_by_id(&self, user_id: &str) -> StoreResult<()>;
}

// =============================================================================
// Token Storage Trait
// =============================================================================

/// Storage operations for tokens reachable by code, access or refresh key.
///
/// All three keys resolve to one document, so removing by any key makes the
/// token unreachable by the other two. Expired documents behave exactly like
/// removed ones.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store a token under all of its keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a token without an access key, or a storage
    /// error if index provisioning or the insert fails.
    async fn create(&self, token: &TokenInfo) -> StoreResult<()>;

    /// Find a token by one of its keys.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no live document matches, or a storage error.
    async fn get_by(&self, key: TokenKey, value: &str) -> StoreResult<TokenInfo>;

    /// Delete the token matching one of its keys.
    ///
    /// Deleting an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn remove_by(&self, key: TokenKey, value: &str) -> StoreResult<()>;

    async fn get_by_code(&self, code: &str) -> StoreResult<TokenInfo> {
        self.get_by(TokenKey::Code, code).await
    }

    async fn get_by_access(&self, access: &str) -> StoreResult<TokenInfo> {
        self.get_by(TokenKey::Access, access).await
    }

    async fn get_by_refresh(&self, refresh: &str) -> StoreResult<TokenInfo> {
        self.get_by(TokenKey::Refresh, refresh).await
    }

    async fn remove_by_code(&self, code: &str) -> StoreResult<()> {
        self.remove_by(TokenKey::Code, code).await
    }

    async fn remove_by_access(&self, access: &str) -> StoreResult<()> {
        self.remove_by(TokenKey::Access, access).await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> StoreResult<()> {
        self.remove_by(TokenKey::Refresh, refresh).await
    }
}

// =============================================================================
// Operation Budget
// =============================================================================

/// Run a storage operation under a wall-clock budget.
///
/// The timer is dropped with the returned future on every exit path.
///
/// # Errors
///
/// Returns `Timeout` if `op` does not finish within `budget`, otherwise
/// whatever `op` returns.
pub async fn within_budget<F, T>(budget: Duration, op: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(budget, op).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(budget)),
    }
}
