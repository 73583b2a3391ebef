//! Client value type.

use serde::{Deserialize, Serialize};

/// OAuth client credentials owned by a user.
///
/// Stores look clients up by `user_id`, not by `id`. The `id` is assigned by
/// the backend on insert and is `None` on values that have not been stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub secret: String,
    pub domain: String,
    pub user_id: String,
}

impl ClientInfo {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        secret: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            secret: secret.into(),
            domain: domain.into(),
            user_id: user_id.into(),
        }
    }

    /// Returns a copy carrying the backend-assigned identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Compares the stored fields, ignoring the backend-assigned `id`.
    #[must_use]
    pub fn same_credentials(&self, other: &ClientInfo) -> bool {
        self.secret == other.secret && self.domain == other.domain && self.user_id == other.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_credentials_ignores_id() {
        let a = ClientInfo::new("test", "testSecret", "localhost");
        let b = a.clone().with_id("665f1c");
        assert_ne!(a, b);
        assert!(a.same_credentials(&b));
    }

    #[test]
    fn test_unsaved_client_omits_id() {
        let value = serde_json::to_value(ClientInfo::new("u", "s", "d")).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["userId"], "u");
    }
}
