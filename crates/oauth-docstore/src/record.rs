//! Backend-neutral token document.
//!
//! One [`TokenRecord`] is written per token issuance. Its three key fields
//! are alternate lookup paths into the same document, and its `expires_at`
//! drives eviction in every backend.

use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

use crate::error::{StoreError, StoreResult};
use crate::types::TokenInfo;

// =============================================================================
// Lookup Keys
// =============================================================================

/// The three lookup paths into a token document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Code,
    Access,
    Refresh,
}

impl TokenKey {
    pub const ALL: [TokenKey; 3] = [TokenKey::Code, TokenKey::Access, TokenKey::Refresh];

    /// Persisted field name for this key.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Code => "code_id",
            Self::Access => "access_id",
            Self::Refresh => "refresh_id",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

// =============================================================================
// Expiry
// =============================================================================

/// Eviction instants derived from a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// When the record stops being reachable.
    pub expires_at: OffsetDateTime,
    /// The refresh token's own expiry, or `expires_at` without one.
    pub refresh_expires_at: OffsetDateTime,
}

impl Expiry {
    /// Earlier of access and refresh expiry when a refresh token exists,
    /// access expiry otherwise.
    #[must_use]
    pub fn of(token: &TokenInfo) -> Self {
        let access = token.access_expires_at();
        if token.has_refresh() {
            let refresh = token.refresh_expires_at();
            Self {
                expires_at: access.min(refresh),
                refresh_expires_at: refresh,
            }
        } else {
            Self {
                expires_at: access,
                refresh_expires_at: access,
            }
        }
    }
}

/// TTL window for a token: its access lifetime rounded to whole seconds.
#[must_use]
pub fn ttl_window(token: &TokenInfo) -> Duration {
    Duration::from_secs(token.access_expires_in.as_secs_f64().round() as u64)
}

// =============================================================================
// Token Record
// =============================================================================

/// A token document as written to a backing collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub access_key: String,
    /// Empty when the token did not come from a code grant.
    pub code_key: String,
    /// Empty when the token has no refresh companion.
    pub refresh_key: String,
    /// JSON snapshot of the full [`TokenInfo`].
    pub payload: Vec<u8>,
    pub expires_at: OffsetDateTime,
    pub refresh_expires_at: OffsetDateTime,
    pub ttl: Duration,
}

impl TokenRecord {
    /// Build the document for a token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the token has no access key, or a
    /// serialization error if the payload cannot be encoded.
    pub fn from_token(token: &TokenInfo) -> StoreResult<Self> {
        if token.access.is_empty() {
            return Err(StoreError::invalid_input("token has no access key"));
        }

        let payload = serde_json::to_vec(token)?;
        let expiry = Expiry::of(token);

        Ok(Self {
            access_key: token.access.clone(),
            code_key: token.code.clone(),
            refresh_key: token.refresh.clone(),
            payload,
            expires_at: expiry.expires_at,
            refresh_expires_at: expiry.refresh_expires_at,
            ttl: ttl_window(token),
        })
    }

    /// Reconstitute the token from the stored payload.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload is not a valid token.
    pub fn decode_payload(payload: &[u8]) -> StoreResult<TokenInfo> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Reconstitute the token from this record.
    ///
    /// # Errors
    ///
    /// See [`TokenRecord::decode_payload`].
    pub fn to_token(&self) -> StoreResult<TokenInfo> {
        Self::decode_payload(&self.payload)
    }

    /// Value of the given key field.
    #[must_use]
    pub fn key(&self, key: TokenKey) -> &str {
        match key {
            TokenKey::Code => &self.code_key,
            TokenKey::Access => &self.access_key,
            TokenKey::Refresh => &self.refresh_key,
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
