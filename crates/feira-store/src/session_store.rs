//! Signed-in session persistence.
//!
//! The session slot holds at most one password-stripped user under a fixed
//! key. It is written on sign-in/sign-up, rewritten on profile edits, and
//! cleared on sign-out or account deletion.

use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};
use crate::kv::{KvStore, KEY_SESSION};
use crate::user_store::SessionUser;

/// Get/set/clear access to the single session record.
#[derive(Clone)]
pub struct SessionStore {
    kv: KvStore,
}

impl SessionStore {
    /// Create a session store backed by `kv`.
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// The persisted session user, or `None` when signed out.
    #[instrument(skip(self))]
    pub async fn get(&self) -> StoreResult<Option<SessionUser>> {
        match self.kv.get(KEY_SESSION).await? {
            None => Ok(None),
            Some(blob) => serde_json::from_str(&blob)
                .map(Some)
                .map_err(|e| StoreError::Corrupted {
                    key: KEY_SESSION,
                    message: e.to_string(),
                }),
        }
    }

    /// Persist `user` as the current session.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn set(&self, user: &SessionUser) -> StoreResult<()> {
        let blob = serde_json::to_string(user)?;
        self.kv.set(KEY_SESSION, blob).await?;
        debug!("session persisted");
        Ok(())
    }

    /// Clear the session slot. Clearing an empty slot is a no-op.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> StoreResult<()> {
        self.kv.remove(KEY_SESSION).await?;
        debug!("session cleared");
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────
