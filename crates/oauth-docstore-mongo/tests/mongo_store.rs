//! Integration tests for the MongoDB backend.
//!
//! Tests use testcontainers to spin up a real MongoDB instance and are
//! ignored by default. Run with `cargo test -- --ignored` where Docker is
//! available.

use std::time::Duration;

use mongodb::Client;
use oauth_docstore::{ClientInfo, ClientStore, StoreConfig, TokenInfo, TokenStore};
use oauth_docstore_mongo::MongoAuthStorage;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::mongo::Mongo;
use time::OffsetDateTime;
use tokio::sync::OnceCell;

// Shared MongoDB container for all tests
static SHARED_MONGO: OnceCell<(ContainerAsync<Mongo>, String)> = OnceCell::const_new();

/// Get or create the shared MongoDB container
async fn get_mongo_url() -> String {
    let (_, url) = SHARED_MONGO
        .get_or_init(|| async {
            let container = Mongo::default()
                .start()
                .await
                .expect("start mongo container");

            let host_port = container
                .get_host_port_ipv4(27017)
                .await
                .expect("get port");
            let url = format!("mongodb://127.0.0.1:{}", host_port);

            (container, url)
        })
        .await;

    url.clone()
}

/// Storage over a database private to one test.
async fn storage(database: &str) -> MongoAuthStorage {
    let url = get_mongo_url().await;
    let client = Client::with_uri_str(&url).await.expect("connect");
    let config = StoreConfig {
        uri: url,
        ..StoreConfig::default()
    }
    .with_database(database);
    MongoAuthStorage::new(client.database(database), config)
}

fn scenario_token() -> TokenInfo {
    let now = OffsetDateTime::now_utc();
    TokenInfo::new("client1", "user1a")
        .with_redirect_uri("http://localhost/")
        .with_scope("test")
        .with_code("C1", now, Duration::from_secs(10))
        .with_access("A1", now, Duration::from_secs(10))
        .with_refresh("R1", now, Duration::from_secs(20))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_get_by_every_key() {
    let tokens = storage("token_get_by_every_key").await.tokens();
    let token = scenario_token();
    tokens.create(&token).await.unwrap();

    assert_eq!(tokens.get_by_code("C1").await.unwrap(), token);
    assert_eq!(tokens.get_by_access("A1").await.unwrap(), token);
    assert_eq!(tokens.get_by_refresh("R1").await.unwrap(), token);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_remove_by_code_hides_other_keys() {
    let tokens = storage("token_remove_by_code").await.tokens();
    tokens.create(&scenario_token()).await.unwrap();

    tokens.remove_by_code("C1").await.unwrap();

    assert!(tokens.get_by_access("A1").await.unwrap_err().is_not_found());
    assert!(tokens.get_by_refresh("R1").await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_remove_by_refresh_hides_other_keys() {
    let tokens = storage("token_remove_by_refresh").await.tokens();
    tokens.create(&scenario_token()).await.unwrap();

    tokens.remove_by_refresh("R1").await.unwrap();

    assert!(tokens.get_by_code("C1").await.unwrap_err().is_not_found());
    assert!(tokens.get_by_access("A1").await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_remove_absent_key_succeeds() {
    let tokens = storage("token_remove_absent").await.tokens();

    tokens.remove_by_code("missing").await.unwrap();
    tokens.remove_by_access("missing").await.unwrap();
    tokens.remove_by_refresh("missing").await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_empty_code_does_not_match_codeless_tokens() {
    let tokens = storage("token_empty_code").await.tokens();
    let token = TokenInfo::new("client1", "user1a").with_access(
        "A2",
        OffsetDateTime::now_utc(),
        Duration::from_secs(10),
    );
    tokens.create(&token).await.unwrap();

    assert!(tokens.get_by_code("").await.unwrap_err().is_not_found());
    tokens.remove_by_refresh("").await.unwrap();
    assert_eq!(tokens.get_by_access("A2").await.unwrap(), token);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_provisions_indexes() {
    let storage = storage("token_indexes").await;
    storage.tokens().create(&scenario_token()).await.unwrap();

    // A later token with another lifetime keeps the existing TTL window.
    let other = TokenInfo::new("client2", "user2").with_access(
        "A3",
        OffsetDateTime::now_utc(),
        Duration::from_secs(3600),
    );
    storage.tokens().create(&other).await.unwrap();

    let names = storage
        .database()
        .collection::<mongodb::bson::Document>("oauth_token")
        .list_index_names()
        .await
        .unwrap();
    assert!(names.contains(&"access_id_1".to_string()));
    assert!(names.contains(&"expired_at_1".to_string()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_client_set_get_remove() {
    let clients = storage("client_crud").await.clients();
    let client = ClientInfo::new("test", "testSecret", "localhost");

    clients.set(&client).await.unwrap();
    let found = clients.get_by_id("test").await.unwrap();
    assert!(found.same_credentials(&client));
    assert!(found.id.is_some());

    clients.remove_by_id("test").await.unwrap();
    assert!(clients.get_by_id("test").await.unwrap_err().is_not_found());
    clients.remove_by_id("test").await.unwrap();
}
