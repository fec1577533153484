//! # Session Store Module
//!
//! Durable persistence for the login session. The store owns exactly two
//! keys, `token` and `user`, and they are always written and cleared
//! together: a session on disk is all-or-nothing.
//!
//! Malformed stored data never propagates as an error. A half-written pair
//! or an unparsable `user` value reads as "no session" and the store heals
//! itself by clearing both keys.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tracing::{debug, warn};

use crate::shared::config::AppConfig;
use crate::shared::error::AuthError;
use crate::shared::user::{Session, UserRecord};

const KEY_TOKEN: &str = "token";
const KEY_USER: &str = "user";

/// Contract for session persistence.
///
/// The controller is generic over this seam so tests and embedders can swap
/// the SQLite store for an in-memory one.
pub trait SessionStore: Send + Sync {
    /// Read the stored session, self-healing on corrupt data
    fn load(&self) -> impl std::future::Future<Output = Result<Option<Session>, AuthError>> + Send;
    /// Persist both session keys atomically
    fn save(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
    /// Remove both session keys; a no-op when nothing is stored
    fn clear(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}

/// SQLite-backed session store
///
/// Lives in the platform data directory by default and uses WAL mode, the
/// same way the rest of the client's local storage does.
#[derive(Debug)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open or create the session database at the default location
    pub async fn open_default() -> Result<Self, AuthError> {
        Self::open(&Self::default_path()).await
    }

    /// Open the session database at the configured location, falling back to
    /// the platform default
    pub async fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        match &config.store_path {
            Some(path) => Self::open(path).await,
            None => Self::open_default().await,
        }
    }

    /// Open or create the session database at `path`
    pub async fn open(path: &Path) -> Result<Self, AuthError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| AuthError::store(err.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Platform-specific default path for the session database
    fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("shopfront");
        path.push("session.db");
        path
    }

    async fn init_schema(&self) -> Result<(), AuthError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    async fn load(&self) -> Result<Option<Session>, AuthError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM session WHERE key IN (?, ?)")
                .bind(KEY_TOKEN)
                .bind(KEY_USER)
                .fetch_all(&self.pool)
                .await?;

        let mut token = None;
        let mut user_raw = None;
        for (key, value) in rows {
            match key.as_str() {
                KEY_TOKEN => token = Some(value),
                KEY_USER => user_raw = Some(value),
                _ => {}
            }
        }

        match (token, user_raw) {
            (None, None) => Ok(None),
            (Some(token), Some(raw)) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => Ok(Some(Session { token, user })),
                Err(err) => {
                    warn!(error = %err, "stored user record unreadable, clearing session");
                    self.clear().await?;
                    Ok(None)
                }
            },
            _ => {
                warn!("half-written session found, clearing both keys");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AuthError> {
        let user_json = serde_json::to_string(&session.user)
            .map_err(|err| AuthError::store(err.to_string()))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT OR REPLACE INTO session (key, value) VALUES (?, ?)")
            .bind(KEY_TOKEN)
            .bind(&session.token)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR REPLACE INTO session (key, value) VALUES (?, ?)")
            .bind(KEY_USER)
            .bind(&user_json)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("session persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM session WHERE key IN (?, ?)")
            .bind(KEY_TOKEN)
            .bind(KEY_USER)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory session store for tests and ephemeral embedding
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw value under one of the session keys, bypassing the
    /// all-or-nothing save path. Lets tests stage corrupt or half-written
    /// state.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("session store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, AuthError> {
        let (token, user_raw) = {
            let values = self.values.lock().expect("session store lock poisoned");
            (values.get(KEY_TOKEN).cloned(), values.get(KEY_USER).cloned())
        };

        match (token, user_raw) {
            (None, None) => Ok(None),
            (Some(token), Some(raw)) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => Ok(Some(Session { token, user })),
                Err(err) => {
                    warn!(error = %err, "stored user record unreadable, clearing session");
                    self.clear().await?;
                    Ok(None)
                }
            },
            _ => {
                warn!("half-written session found, clearing both keys");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AuthError> {
        let user_json = serde_json::to_string(&session.user)
            .map_err(|err| AuthError::store(err.to_string()))?;
        let mut values = self.values.lock().expect("session store lock poisoned");
        values.insert(KEY_TOKEN.to_string(), session.token.clone());
        values.insert(KEY_USER.to_string(), user_json);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        let mut values = self.values.lock().expect("session store lock poisoned");
        values.remove(KEY_TOKEN);
        values.remove(KEY_USER);
        Ok(())
    }
}
