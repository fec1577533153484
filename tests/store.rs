//! SQLite session store integration tests
//!
//! Persistence across store instances, corruption self-healing, and the
//! rehydration path through a fresh controller.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{success_body, test_config};
use shopfront::auth::{AuthController, SessionStore, SqliteSessionStore};
use shopfront::shared::{Session, UserRecord};

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("session.db")
}

fn sample_session() -> Session {
    Session {
        token: "tkn".to_string(),
        user: UserRecord {
            id: "42".to_string(),
            email: "a@b.com".to_string(),
            name: Some("Ada".to_string()),
            mobile: None,
            profile_picture: None,
            extra: serde_json::Map::new(),
        },
    }
}

/// Raw pool on the same file, for staging corrupt rows behind the store's back
async fn raw_pool(dir: &TempDir) -> SqlitePool {
    let url = format!("sqlite:{}", db_path(dir).display());
    SqlitePool::connect(&url).await.unwrap()
}

#[tokio::test]
async fn session_survives_store_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
        store.save(&sample_session()).await.unwrap();
    }

    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded, sample_session());
}

#[tokio::test]
async fn save_overwrites_previous_session() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();

    store.save(&sample_session()).await.unwrap();
    let mut next = sample_session();
    next.token = "tkn2".to_string();
    next.user.name = Some("Grace".to_string());
    store.save(&next).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.token, "tkn2");
    assert_eq!(loaded.user.name.as_deref(), Some("Grace"));
}

#[tokio::test]
async fn corrupt_user_value_reads_as_absent_and_purges_both_keys() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
    store.save(&sample_session()).await.unwrap();

    let pool = raw_pool(&dir).await;
    sqlx::query("UPDATE session SET value = '{broken' WHERE key = 'user'")
        .execute(&pool)
        .await
        .unwrap();

    assert!(store.load().await.unwrap().is_none());

    // Self-heal removed the token too
    let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM session")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert!(rows.is_empty());

    // Second load is a plain miss, not another heal
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn half_written_session_reads_as_absent() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
    store.save(&sample_session()).await.unwrap();

    let pool = raw_pool(&dir).await;
    sqlx::query("DELETE FROM session WHERE key = 'user'")
        .execute(&pool)
        .await
        .unwrap();

    assert!(store.load().await.unwrap().is_none());
    let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM session")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn clear_is_idempotent_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();

    store.clear().await.unwrap();
    store.save(&sample_session()).await.unwrap();
    store.clear().await.unwrap();
    store.clear().await.unwrap();

    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn login_then_restart_rehydrates_controller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri());

    {
        let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
        let mut controller = AuthController::new(&config, store);
        controller.init().await;
        controller.login("a@b.com", "secret1", None).await.unwrap();
        assert!(controller.is_logged_in());
    }

    // "Process restart": a fresh controller over the same database
    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
    let mut controller = AuthController::new(&config, store);
    controller.init().await;

    assert!(controller.is_logged_in());
    assert_eq!(controller.user().unwrap().email, "a@b.com");
}

#[tokio::test]
async fn logout_then_restart_stays_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri());

    {
        let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
        let mut controller = AuthController::new(&config, store);
        controller.init().await;
        controller.login("a@b.com", "secret1", None).await.unwrap();
        controller.logout().await.unwrap();
    }

    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
    let mut controller = AuthController::new(&config, store);
    controller.init().await;
    assert!(!controller.is_logged_in());
}

#[tokio::test]
async fn corrupt_store_at_startup_yields_logged_out_controller() {
    let dir = TempDir::new().unwrap();
    {
        let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
        store.save(&sample_session()).await.unwrap();
        let pool = raw_pool(&dir).await;
        sqlx::query("UPDATE session SET value = 'null' WHERE key = 'user'")
            .execute(&pool)
            .await
            .unwrap();
    }

    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();
    let mut controller = AuthController::new(&test_config("http://127.0.0.1:9"), store);
    controller.init().await;

    assert!(!controller.is_logged_in());
    assert!(!controller.loading());
}

#[tokio::test]
async fn unknown_profile_fields_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let store = SqliteSessionStore::open(&db_path(&dir)).await.unwrap();

    let mut session = sample_session();
    session
        .user
        .extra
        .insert("shippingAddress".to_string(), json!({"city": "Lagos"}));
    store.save(&session).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(
        loaded.user.extra.get("shippingAddress").unwrap()["city"],
        "Lagos"
    );
}
