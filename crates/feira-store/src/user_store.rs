//! Registered-users persistence.
//!
//! The registered-users collection is a JSON array stored under a single
//! key-value entry. Every mutation decodes the array, applies the change,
//! and rewrites the whole blob inside one atomic read-modify-write cycle.
//!
//! Blobs use camelCase field names, matching the on-device data format the
//! original app left behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::kv::{KvStore, KEY_USERS};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// A registered user: the canonical, password-bearing record.
///
/// The password is stored in plaintext. The original app did the same and
/// flagged it as non-production in its own comments; keeping the behavior
/// keeps registration and login observably identical. Any hardening must
/// be a deliberate, flagged change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v7).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email, unique across all registered users (exact match).
    pub email: String,
    /// Plaintext password (see type docs).
    pub password: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user record with a fresh id and creation timestamp.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
            created_at: Utc::now(),
        }
    }
}

/// The password-stripped projection of a [`User`].
///
/// This is the only user shape that crosses the store boundary on reads;
/// the session slot and every login result carry no password field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// A profile edit: new name and email for an existing user.
///
/// Applied as a shallow merge; the stored password and creation timestamp
/// are preserved untouched.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub id: String,
    pub name: String,
    pub email: String,
}

// ═══════════════════════════════════════════════════════════════════════
//  UserStore
// ═══════════════════════════════════════════════════════════════════════

/// CRUD operations on the registered-users collection.
#[derive(Clone)]
pub struct UserStore {
    kv: KvStore,
}

impl UserStore {
    /// Create a user store backed by `kv`.
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// All registered users in insertion order.
    ///
    /// An absent key yields an empty collection; an undecodable blob
    /// surfaces [`StoreError::Corrupted`] rather than masking data loss.
    #[instrument(skip(self))]
    pub async fn all(&self) -> StoreResult<Vec<User>> {
        let raw = self.kv.get(KEY_USERS).await?;
        decode_users(raw)
    }

    /// Append a caller-built user record.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] when any registered user
    /// already has the exact same email, leaving the collection unchanged.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn insert(&self, user: User) -> StoreResult<()> {
        let id = user.id.clone();
        self.kv
            .update(KEY_USERS, move |raw| {
                let mut users = decode_users(raw)?;
                if users.iter().any(|u| u.email == user.email) {
                    return Err(StoreError::DuplicateEmail { email: user.email });
                }
                users.push(user);
                Ok(Some(encode_users(&users)?))
            })
            .await?;

        debug!(user_id = %id, "user registered");
        Ok(())
    }

    /// Validate login credentials with an exact email + password scan.
    ///
    /// Returns the password-stripped user on a match, otherwise
    /// [`StoreError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn validate_login(&self, email: &str, password: &str) -> StoreResult<SessionUser> {
        let users = self.all().await?;
        users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(SessionUser::from)
            .ok_or(StoreError::InvalidCredentials)
    }

    /// Apply a profile edit to the canonical record.
    ///
    /// Fails with [`StoreError::UserNotFound`] when the id is absent and
    /// [`StoreError::DuplicateEmail`] when the new email belongs to a
    /// *different* registered user. The stored password is preserved.
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn update(&self, profile: ProfileUpdate) -> StoreResult<()> {
        self.kv
            .update(KEY_USERS, move |raw| {
                let mut users = decode_users(raw)?;
                let index = users
                    .iter()
                    .position(|u| u.id == profile.id)
                    .ok_or(StoreError::UserNotFound { id: profile.id.clone() })?;
                if users
                    .iter()
                    .any(|u| u.email == profile.email && u.id != profile.id)
                {
                    return Err(StoreError::DuplicateEmail {
                        email: profile.email,
                    });
                }
                users[index].name = profile.name;
                users[index].email = profile.email;
                Ok(Some(encode_users(&users)?))
            })
            .await
    }

    /// Change a user's password after checking the current one.
    ///
    /// Enforces a minimum length of [`MIN_PASSWORD_LEN`] characters on the
    /// new password; no further complexity policy applies.
    #[instrument(skip(self, current, new))]
    pub async fn change_password(&self, id: &str, current: &str, new: &str) -> StoreResult<()> {
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(StoreError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        let id = id.to_string();
        let current = current.to_string();
        let new = new.to_string();
        self.kv
            .update(KEY_USERS, move |raw| {
                let mut users = decode_users(raw)?;
                let index = users
                    .iter()
                    .position(|u| u.id == id)
                    .ok_or(StoreError::UserNotFound { id: id.clone() })?;
                if users[index].password != current {
                    return Err(StoreError::InvalidCredentials);
                }
                users[index].password = new;
                Ok(Some(encode_users(&users)?))
            })
            .await?;

        debug!("password changed");
        Ok(())
    }

    /// Delete a user's canonical record permanently.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let id_owned = id.to_string();
        self.kv
            .update(KEY_USERS, move |raw| {
                let mut users = decode_users(raw)?;
                let before = users.len();
                users.retain(|u| u.id != id_owned);
                if users.len() == before {
                    return Err(StoreError::UserNotFound { id: id_owned });
                }
                Ok(Some(encode_users(&users)?))
            })
            .await?;

        debug!(user_id = %id, "user deleted");
        Ok(())
    }
}

// ── blob codec ───────────────────────────────────────────────────────

fn decode_users(raw: Option<String>) -> StoreResult<Vec<User>> {
    match raw {
        None => Ok(Vec::new()),
        Some(blob) => serde_json::from_str(&blob).map_err(|e| StoreError::Corrupted {
            key: KEY_USERS,
            message: e.to_string(),
        }),
    }
}

fn encode_users(users: &[User]) -> StoreResult<String> {
    Ok(serde_json::to_string(users)?)
}

// ── tests ────────────────────────────────────────────────────────────
