//! Store behavior tests against the in-memory backend.
//!
//! Covers lookup by every key, cross-key removal, idempotent deletes and
//! expiry, plus the client store's user-keyed CRUD.

use std::time::Duration;

use oauth_docstore::{
    ClientInfo, ClientStore, InMemoryClientStore, InMemoryTokenStore, TokenInfo, TokenStore,
};
use time::OffsetDateTime;

/// Token with access "A1" (10s), code "C1" and refresh "R1" (20s).
fn scenario_token() -> TokenInfo {
    let now = OffsetDateTime::now_utc();
    TokenInfo::new("client1", "user1a")
        .with_redirect_uri("http://localhost/")
        .with_scope("test")
        .with_code("C1", now, Duration::from_secs(10))
        .with_access("A1", now, Duration::from_secs(10))
        .with_refresh("R1", now, Duration::from_secs(20))
}

fn assert_same_token(got: &TokenInfo, want: &TokenInfo) {
    assert_eq!(got.client_id, want.client_id);
    assert_eq!(got.user_id, want.user_id);
    assert_eq!(got.redirect_uri, want.redirect_uri);
    assert_eq!(got.scope, want.scope);
    assert_eq!(got.code, want.code);
    assert_eq!(got.access, want.access);
    assert_eq!(got.refresh, want.refresh);
    assert_eq!(
        got.access_create_at.unix_timestamp(),
        want.access_create_at.unix_timestamp()
    );
    assert_eq!(
        got.code_create_at.unix_timestamp(),
        want.code_create_at.unix_timestamp()
    );
    assert_eq!(got.access_expires_in.as_secs(), want.access_expires_in.as_secs());
    assert_eq!(got.refresh_expires_in.as_secs(), want.refresh_expires_in.as_secs());
}

#[tokio::test]
async fn test_get_by_every_key() {
    let store = InMemoryTokenStore::new();
    let token = scenario_token();
    store.create(&token).await.unwrap();

    assert_same_token(&store.get_by_code("C1").await.unwrap(), &token);
    assert_same_token(&store.get_by_access("A1").await.unwrap(), &token);
    assert_same_token(&store.get_by_refresh("R1").await.unwrap(), &token);
}

#[tokio::test]
async fn test_remove_by_code_hides_other_keys() {
    let store = InMemoryTokenStore::new();
    store.create(&scenario_token()).await.unwrap();

    store.remove_by_code("C1").await.unwrap();

    assert!(store.get_by_access("A1").await.unwrap_err().is_not_found());
    assert!(store.get_by_refresh("R1").await.unwrap_err().is_not_found());
    assert!(store.get_by_code("C1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_remove_by_access_hides_other_keys() {
    let store = InMemoryTokenStore::new();
    store.create(&scenario_token()).await.unwrap();

    store.remove_by_access("A1").await.unwrap();

    assert!(store.get_by_code("C1").await.unwrap_err().is_not_found());
    assert!(store.get_by_refresh("R1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_remove_by_refresh_hides_other_keys() {
    let store = InMemoryTokenStore::new();
    store.create(&scenario_token()).await.unwrap();

    store.remove_by_refresh("R1").await.unwrap();

    assert!(store.get_by_code("C1").await.unwrap_err().is_not_found());
    assert!(store.get_by_access("A1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_remove_absent_key_succeeds() {
    let store = InMemoryTokenStore::new();

    store.remove_by_code("missing").await.unwrap();
    store.remove_by_access("missing").await.unwrap();
    store.remove_by_refresh("missing").await.unwrap();
}

#[tokio::test]
async fn test_token_without_code_or_refresh() {
    let store = InMemoryTokenStore::new();
    let token = TokenInfo::new("client1", "user1a").with_access(
        "A2",
        OffsetDateTime::now_utc(),
        Duration::from_secs(10),
    );
    store.create(&token).await.unwrap();

    assert_eq!(store.get_by_access("A2").await.unwrap(), token);
    assert!(store.get_by_code("").await.unwrap_err().is_not_found());
    assert!(store.get_by_refresh("").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_token_without_access_is_rejected() {
    let store = InMemoryTokenStore::new();
    let token = TokenInfo::new("client1", "user1a").with_code(
        "C9",
        OffsetDateTime::now_utc(),
        Duration::from_secs(10),
    );

    let err = store.create(&token).await.unwrap_err();
    assert!(err.is_invalid_input());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_expiry_matches_explicit_removal() {
    let store = InMemoryTokenStore::new();
    let issued = OffsetDateTime::now_utc() - time::Duration::seconds(15);
    let token = TokenInfo::new("client1", "user1a")
        .with_code("C1", issued, Duration::from_secs(10))
        .with_access("A1", issued, Duration::from_secs(10))
        .with_refresh("R1", issued, Duration::from_secs(20));
    store.create(&token).await.unwrap();

    // Access expired 5s ago; the refresh token alone does not keep it alive.
    assert!(store.get_by_code("C1").await.unwrap_err().is_not_found());
    assert!(store.get_by_access("A1").await.unwrap_err().is_not_found());
    assert!(store.get_by_refresh("R1").await.unwrap_err().is_not_found());

    assert_eq!(store.purge_expired().await, 1);
    store.remove_by_access("A1").await.unwrap();
}

#[tokio::test]
async fn test_client_set_get_remove() {
    let store = InMemoryClientStore::new();
    let client = ClientInfo::new("test", "testSecret", "localhost");

    store.set(&client).await.unwrap();

    let found = store.get_by_id("test").await.unwrap();
    assert!(found.same_credentials(&client));

    store.remove_by_id("test").await.unwrap();
    assert!(store.get_by_id("test").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_client_remove_absent_succeeds() {
    let store = InMemoryClientStore::new();
    store.remove_by_id("nobody").await.unwrap();
}

#[tokio::test]
async fn test_client_set_allows_duplicates() {
    let store = InMemoryClientStore::new();
    let client = ClientInfo::new("test", "testSecret", "localhost");

    store.set(&client).await.unwrap();
    store.set(&client).await.unwrap();

    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_stores_are_shared_across_tasks() {
    let store = InMemoryTokenStore::new();
    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let token = TokenInfo::new("client1", "user1a").with_access(
                format!("A{i}"),
                OffsetDateTime::now_utc(),
                Duration::from_secs(60),
            );
            store.create(&token).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.len().await, 16);
    assert!(store.get_by_access("A7").await.is_ok());
}
