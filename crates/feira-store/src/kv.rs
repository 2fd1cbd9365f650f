//! Device key-value store.
//!
//! The on-device store is a single `kv` table of string keys mapping to
//! JSON-encoded blobs. Each named collection (session user, registered
//! users, shopping lists) lives under one fixed key; the higher-level
//! stores rewrite a collection's entire blob on every mutation, which is
//! acceptable for small device-local data sets and is not expected to
//! scale beyond that.

use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::StoreResult;

// ═══════════════════════════════════════════════════════════════════════
//  Keys
// ═══════════════════════════════════════════════════════════════════════

/// Key for the signed-in session user (single JSON object).
pub const KEY_SESSION: &str = "feira:user";

/// Key for the registered-users collection (JSON array).
pub const KEY_USERS: &str = "feira:users_db";

/// Key for the shopping-lists collection (JSON array).
pub const KEY_LISTS: &str = "feira:lists";

// ═══════════════════════════════════════════════════════════════════════
//  KvStore
// ═══════════════════════════════════════════════════════════════════════

/// String-keyed access to the JSON blobs in the `kv` table.
#[derive(Clone)]
pub struct KvStore {
    db: Database,
}

impl KvStore {
    /// Create a key-value store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Fetch the value under `key`, or `None` if the key is absent.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &'static str) -> StoreResult<Option<String>> {
        self.db
            .execute(move |conn| {
                let result = conn.query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    rusqlite::params![key],
                    |row| row.get(0),
                );
                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    /// Store `value` under `key`, replacing any previous value.
    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &'static str, value: String) -> StoreResult<()> {
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![key, value],
                )?;
                Ok(())
            })
            .await
    }

    /// Remove the value under `key`. Removing an absent key is a no-op.
    #[instrument(skip(self))]
    pub async fn remove(&self, key: &'static str) -> StoreResult<()> {
        self.db
            .execute(move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                Ok(())
            })
            .await
    }

    /// Remove several keys in one transaction.
    #[instrument(skip(self))]
    pub async fn multi_remove(&self, keys: &'static [&'static str]) -> StoreResult<()> {
        self.db
            .execute_mut(move |conn| {
                let tx = conn.transaction()?;
                for key in keys {
                    tx.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
    }

    /// Run a read-modify-write cycle for one key atomically.
    ///
    /// The closure receives the current value (if any) and returns the new
    /// value to store, or `None` to leave the key untouched. The whole cycle
    /// runs under the connection mutex, so concurrent mutations of the same
    /// collection are serialized rather than racing.
    pub async fn update<F>(&self, key: &'static str, f: F) -> StoreResult<()>
    where
        F: FnOnce(Option<String>) -> StoreResult<Option<String>> + Send + 'static,
    {
        self.db
            .execute(move |conn| {
                let current = conn
                    .query_row(
                        "SELECT value FROM kv WHERE key = ?1",
                        rusqlite::params![key],
                        |row| row.get(0),
                    )
                    .map(Some)
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(None),
                        other => Err(other),
                    })?;

                if let Some(next) = f(current)? {
                    conn.execute(
                        "INSERT INTO kv (key, value) VALUES (?1, ?2) \
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        rusqlite::params![key, next],
                    )?;
                }
                Ok(())
            })
            .await
    }

    /// Like [`KvStore::update`], but the closure also produces a value that
    /// is handed back to the caller (e.g. the merged record after a patch).
    pub async fn update_returning<F, T>(&self, key: &'static str, f: F) -> StoreResult<T>
    where
        F: FnOnce(Option<String>) -> StoreResult<(Option<String>, T)> + Send + 'static,
        T: Send + 'static,
    {
        self.db
            .execute(move |conn| {
                let current = conn
                    .query_row(
                        "SELECT value FROM kv WHERE key = ?1",
                        rusqlite::params![key],
                        |row| row.get(0),
                    )
                    .map(Some)
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(None),
                        other => Err(other),
                    })?;

                let (next, out) = f(current)?;
                if let Some(next) = next {
                    conn.execute(
                        "INSERT INTO kv (key, value) VALUES (?1, ?2) \
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        rusqlite::params![key, next],
                    )?;
                }
                Ok(out)
            })
            .await
    }
}

/// Remove the session slot and the registered-users collection in one batch.
///
/// The lists collection is deliberately left in place: wiping account data
/// mirrors the original app's behavior, which never cleared lists.
#[instrument(skip(kv))]
pub async fn clear_account_data(kv: &KvStore) -> StoreResult<()> {
    kv.multi_remove(&[KEY_SESSION, KEY_USERS]).await?;
    debug!("account data cleared (session + users)");
    Ok(())
}

// ── tests ────────────────────────────────────────────────────────────
