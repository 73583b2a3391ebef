//! Token value type.
//!
//! A single [`TokenInfo`] describes one token issuance: the authorization
//! code it came from (if any), the access token, and the refresh token (if
//! any), each with its own creation time and lifetime.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Token issuance snapshot exchanged with the authorization framework.
///
/// Empty `code` means the token was not created from a code grant; empty
/// `refresh` means the token does not support refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenInfo {
    pub client_id: String,
    pub user_id: String,
    pub redirect_uri: String,
    pub scope: String,

    pub code: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
    #[serde(with = "time::serde::rfc3339")]
    pub code_create_at: OffsetDateTime,
    #[serde(with = "humantime_serde")]
    pub code_expires_in: Duration,

    pub access: String,
    #[serde(with = "time::serde::rfc3339")]
    pub access_create_at: OffsetDateTime,
    #[serde(with = "humantime_serde")]
    pub access_expires_in: Duration,

    pub refresh: String,
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_create_at: OffsetDateTime,
    #[serde(with = "humantime_serde")]
    pub refresh_expires_in: Duration,
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            user_id: String::new(),
            redirect_uri: String::new(),
            scope: String::new(),
            code: String::new(),
            code_challenge: String::new(),
            code_challenge_method: String::new(),
            code_create_at: OffsetDateTime::UNIX_EPOCH,
            code_expires_in: Duration::ZERO,
            access: String::new(),
            access_create_at: OffsetDateTime::UNIX_EPOCH,
            access_expires_in: Duration::ZERO,
            refresh: String::new(),
            refresh_create_at: OffsetDateTime::UNIX_EPOCH,
            refresh_expires_in: Duration::ZERO,
        }
    }
}

impl TokenInfo {
    /// Create an empty token bound to a client and user.
    #[must_use]
    pub fn new(client_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Attach an authorization code.
    #[must_use]
    pub fn with_code(
        mut self,
        code: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.code = code.into();
        self.code_create_at = created_at;
        self.code_expires_in = expires_in;
        self
    }

    /// Attach a PKCE challenge to the authorization code.
    #[must_use]
    pub fn with_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.code_challenge = challenge.into();
        self.code_challenge_method = method.into();
        self
    }

    /// Attach the access token.
    #[must_use]
    pub fn with_access(
        mut self,
        access: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.access = access.into();
        self.access_create_at = created_at;
        self.access_expires_in = expires_in;
        self
    }

    /// Attach a refresh token.
    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.refresh = refresh.into();
        self.refresh_create_at = created_at;
        self.refresh_expires_in = expires_in;
        self
    }

    /// Returns `true` if the token was issued from an authorization code.
    #[must_use]
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    /// Returns `true` if the token carries a refresh token.
    #[must_use]
    pub fn has_refresh(&self) -> bool {
        !self.refresh.is_empty()
    }

    #[must_use]
    pub fn code_expires_at(&self) -> OffsetDateTime {
        add_lifetime(self.code_create_at, self.code_expires_in)
    }

    #[must_use]
    pub fn access_expires_at(&self) -> OffsetDateTime {
        add_lifetime(self.access_create_at, self.access_expires_in)
    }

    #[must_use]
    pub fn refresh_expires_at(&self) -> OffsetDateTime {
        add_lifetime(self.refresh_create_at, self.refresh_expires_in)
    }
}

/// `at + lifetime`, saturating at the last representable day.
fn add_lifetime(at: OffsetDateTime, lifetime: Duration) -> OffsetDateTime {
    time::Duration::try_from(lifetime)
        .ok()
        .and_then(|lifetime| at.checked_add(lifetime))
        .unwrap_or_else(|| Date::MAX.midnight().assume_utc())
}
