//! # oauth-docstore
//!
//! Persistence for OAuth2 authorization artifacts consumed by an
//! authorization-server framework:
//!
//! - OAuth clients, looked up by owning user
//! - Tokens, looked up by authorization code, access token or refresh token
//!
//! A token is written once as a single document reachable through three
//! keys, and expires on its own once the earlier of its access and refresh
//! expiry has passed.
//!
//! ## Modules
//!
//! - [`types`] - Client and token value objects
//! - [`record`] - Token document layout and expiry derivation
//! - [`storage`] - `ClientStore` / `TokenStore` traits and the operation budget
//! - [`memory`] - In-process backend with a background expiry sweeper
//! - [`config`] - Store configuration and loader
//! - [`error`] - Error taxonomy
//!
//! The MongoDB backend lives in `oauth-docstore-mongo`.
//!
//! # Example
//!
//! ```ignore
//! use oauth_docstore::{InMemoryTokenStore, TokenInfo, TokenStore};
//!
//! let store = InMemoryTokenStore::new();
//! store.create(&token).await?;
//! let token = store.get_by_access("A1").await?;
//! store.remove_by_code("C1").await?;
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod record;
pub mod storage;
pub mod types;

pub use config::{ConfigError, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryClientStore, InMemoryTokenStore, spawn_expiry_sweeper};
pub use record::{Expiry, TokenKey, TokenRecord};
pub use storage::{ClientStore, TokenStore, within_budget};
pub use types::{ClientInfo, TokenInfo};
