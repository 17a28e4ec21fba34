//! SQLite-backed persistent storage for the session keys.
//!
//! One `kv` table per user profile, stored at
//! `{app_data_dir}/gasportal/session.db`. Every handle opened on the same file
//! sees the same session.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use gasportal_auth::{KeyValueStore, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite key/value store (lazy initialization).
#[derive(Debug, Clone)]
pub struct SqliteStore {
    location: Location,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteStore {
    /// Store in the OS app data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::open(session_db_path()?))
    }

    /// Store in a specific database file (created on first use).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Private in-memory database; lives as long as the store's clones.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the pool, initializing it on first use.
    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let pool = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create session directory at {parent:?}")
                    })?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                SqlitePoolOptions::new()
                    .connect_with(options)
                    .await
                    .with_context(|| format!("failed to open session store at {path:?}"))?
            }
            Location::Memory => {
                // A single connection that never idles out; each new
                // connection to `:memory:` would be a different database.
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .context("invalid in-memory SQLite URL")?;
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
                    .context("failed to open in-memory session store")?
            }
        };

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv table")?;

        *guard = Some(pool.clone());
        Ok(pool)
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let pool = self.pool().await?;
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .with_context(|| format!("failed to read `{key}`"))?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn read_batch(&self, keys: &[&str]) -> anyhow::Result<Vec<Option<String>>> {
        let pool = self.pool().await?;

        let mut tx = pool.begin().await.context("failed to begin read")?;
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?1")
                .bind(*key)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("failed to read `{key}`"))?;
            values.push(value);
        }
        tx.commit().await.context("failed to finish read")?;
        Ok(values)
    }

    /// Upsert `entries` in one transaction, optionally guarded by `expected`.
    async fn write_batch(
        &self,
        expected: Option<(&str, Option<&str>)>,
        entries: &[(&str, String)],
    ) -> anyhow::Result<bool> {
        let pool = self.pool().await?;
        let now = Utc::now().to_rfc3339();

        let mut tx = pool.begin().await.context("failed to begin write")?;
        if let Some(expected) = expected {
            if !holds(&mut tx, expected).await? {
                tx.rollback().await.context("failed to abandon write")?;
                return Ok(false);
            }
        }
        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to write `{key}`"))?;
        }
        tx.commit().await.context("failed to commit write")?;
        Ok(true)
    }

    /// Delete `keys` in one transaction, optionally guarded by `expected`.
    async fn remove_batch(
        &self,
        expected: Option<(&str, Option<&str>)>,
        keys: &[&str],
    ) -> anyhow::Result<bool> {
        let pool = self.pool().await?;

        let mut tx = pool.begin().await.context("failed to begin removal")?;
        if let Some(expected) = expected {
            if !holds(&mut tx, expected).await? {
                tx.rollback().await.context("failed to abandon removal")?;
                return Ok(false);
            }
        }
        for key in keys {
            sqlx::query("DELETE FROM kv WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to remove `{key}`"))?;
        }
        tx.commit().await.context("failed to commit removal")?;
        Ok(true)
    }
}

/// Whether `key` holds `value` (`None`: no row) inside the open transaction.
///
/// The transaction keeps its read lock from here to the write, so SQLite
/// rejects the write rather than let another commit slip in between.
async fn holds(
    conn: &mut SqliteConnection,
    (key, value): (&str, Option<&str>),
) -> anyhow::Result<bool> {
    let current: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?1")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("failed to check `{key}`"))?;
    Ok(current.as_deref() == value)
}

fn backend_error(err: anyhow::Error) -> StorageError {
    StorageError::Backend(format!("{err:#}"))
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key).await.map_err(backend_error)
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        self.read_batch(keys).await.map_err(backend_error)
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        self.write_batch(None, entries)
            .await
            .map(|_| ())
            .map_err(backend_error)
    }

    async fn set_many_if(
        &self,
        expected: (&str, Option<&str>),
        entries: &[(&str, String)],
    ) -> Result<bool, StorageError> {
        self.write_batch(Some(expected), entries).await.map_err(backend_error)
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.remove_batch(None, keys)
            .await
            .map(|_| ())
            .map_err(backend_error)
    }

    async fn remove_many_if(
        &self,
        expected: (&str, Option<&str>),
        keys: &[&str],
    ) -> Result<bool, StorageError> {
        self.remove_batch(Some(expected), keys).await.map_err(backend_error)
    }
}

/// Resolve `{app_data_dir}/gasportal/session.db`.
fn session_db_path() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory from data_dir() or home_dir()")?;

    dir.push("gasportal");
    dir.push("session.db");
    Ok(dir)
}
