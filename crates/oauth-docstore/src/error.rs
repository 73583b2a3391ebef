//! Storage error types.
//!
//! Lookups surface [`StoreError::NotFound`] as a distinct outcome so callers
//! can treat an absent or expired credential as a normal result. Everything
//! else is a storage failure and is propagated unchanged.

use std::time::Duration;

/// Boxed driver error carried by [`StoreError::Backend`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during client or token storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The lookup matched zero documents.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation did not complete within its time budget.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Payload serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document field could not be mapped to or from its stored form.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The input was rejected before reaching the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The underlying database driver failed.
    #[error("Backend error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    // -------------------------------------------------------------------------
    // Constructor Methods
    // -------------------------------------------------------------------------

    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Wrap a driver error.
    ///
    /// Shaped to be passed directly to `map_err`.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Backend(err.into())
    }

    // -------------------------------------------------------------------------
    // Predicate Methods
    // -------------------------------------------------------------------------

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if the operation ran out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if this is a serialization or encoding error.
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::Encoding(_))
    }

    /// Returns `true` if this is an invalid input error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` if the caller can act on this error (4xx equivalent).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidInput(_))
    }

    /// Returns `true` if the storage layer itself failed (5xx equivalent).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = StoreError::not_found("token with access_id");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "Not found: token with access_id");
    }

    #[test]
    fn test_timeout_is_server_error() {
        let err = StoreError::Timeout(Duration::from_secs(5));
        assert!(err.is_timeout());
        assert!(err.is_server_error());
        assert_eq!(err.to_string(), "Operation timed out after 5s");
    }

    #[test]
    fn test_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = StoreError::from(json_err);
        assert!(err.is_serialization_error());
        assert!(err.is_server_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_backend_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::backend(io);
        assert!(err.is_server_error());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "Backend error: refused");
    }

    #[test]
    fn test_invalid_input() {
        let err = StoreError::invalid_input("access token is empty");
        assert!(err.is_invalid_input());
        assert!(err.is_client_error());
    }
}
