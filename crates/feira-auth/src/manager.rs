//! Session lifecycle management.
//!
//! [`AuthManager`] owns the signed-in user state for the app's lifetime,
//! backed by the persistence layer. It is an explicit, injectable instance
//! with an explicit [`AuthManager::load`] init step: callers construct it
//! once at startup and hand it to whichever surface drives the app.
//!
//! State machine: `Loading` → `Unauthenticated` ↔ `Authenticated`. There is
//! no terminal state; the machine cycles for the app's lifetime.

use std::sync::RwLock;

use feira_store::{ProfileUpdate, SessionStore, SessionUser, StoreError, User, UserStore};
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, AuthResult};

// ═══════════════════════════════════════════════════════════════════════
//  State
// ═══════════════════════════════════════════════════════════════════════

/// The session manager's view of the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// The persisted session has not been read yet.
    Loading,
    /// No user is signed in.
    Unauthenticated,
    /// A user is signed in; the session copy never carries a password.
    Authenticated(SessionUser),
}

impl AuthState {
    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  AuthManager
// ═══════════════════════════════════════════════════════════════════════

/// Owns the in-memory session state and keeps it in sync with the store.
pub struct AuthManager {
    users: UserStore,
    sessions: SessionStore,
    state: RwLock<AuthState>,
}

impl AuthManager {
    /// Create a manager in the `Loading` state. Call [`AuthManager::load`]
    /// before anything else.
    pub fn new(users: UserStore, sessions: SessionStore) -> Self {
        Self {
            users,
            sessions,
            state: RwLock::new(AuthState::Loading),
        }
    }

    /// Read the persisted session and leave the `Loading` state.
    ///
    /// A corrupted session slot degrades to `Unauthenticated` (with a
    /// warning) so a damaged device store never locks the user out of the
    /// sign-in flow; other store failures propagate.
    #[instrument(skip(self))]
    pub async fn load(&self) -> AuthResult<AuthState> {
        let next = match self.sessions.get().await {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "session restored");
                AuthState::Authenticated(user)
            }
            Ok(None) => AuthState::Unauthenticated,
            Err(StoreError::Corrupted { key, message }) => {
                warn!(key, %message, "session slot corrupted, treating as signed out");
                AuthState::Unauthenticated
            }
            Err(other) => return Err(other.into()),
        };
        self.set_state(next.clone());
        Ok(next)
    }

    /// Sign in with email and password.
    ///
    /// On success the password-stripped user is persisted as the session
    /// and becomes the in-memory state; on failure the state is untouched.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<SessionUser> {
        let user = self.users.validate_login(email, password).await?;
        self.sessions.set(&user).await?;
        self.set_state(AuthState::Authenticated(user.clone()));

        info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    /// Register a new account and sign it in immediately.
    ///
    /// The canonical record (with password) goes to the registered-users
    /// collection; the session slot only ever receives the stripped copy.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> AuthResult<SessionUser> {
        let record = User::new(name, email, password);
        let session = SessionUser::from(&record);

        self.users.insert(record).await?;
        self.sessions.set(&session).await?;
        self.set_state(AuthState::Authenticated(session.clone()));

        info!(user_id = %session.id, "registered and signed in");
        Ok(session)
    }

    /// Sign out, clearing the session slot.
    ///
    /// Registered accounts are untouched; other users on the device can
    /// still sign in.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.sessions.clear().await?;
        self.set_state(AuthState::Unauthenticated);

        info!("signed out");
        Ok(())
    }

    /// Edit the signed-in user's name and email.
    ///
    /// The canonical record is updated first; only on success is the
    /// session copy rewritten, so a failed update leaves both untouched.
    #[instrument(skip(self))]
    pub async fn update_profile(&self, name: &str, email: &str) -> AuthResult<SessionUser> {
        let current = self.current_user().ok_or(AuthError::NoSession)?;

        self.users
            .update(ProfileUpdate {
                id: current.id.clone(),
                name: name.to_string(),
                email: email.to_string(),
            })
            .await?;

        let updated = SessionUser {
            id: current.id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: current.created_at,
        };
        self.sessions.set(&updated).await?;
        self.set_state(AuthState::Authenticated(updated.clone()));

        info!(user_id = %updated.id, "profile updated");
        Ok(updated)
    }

    /// Delete the signed-in user's account and end the session.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> AuthResult<()> {
        let current = self.current_user().ok_or(AuthError::NoSession)?;

        self.users.delete(&current.id).await?;
        self.sessions.clear().await?;
        self.set_state(AuthState::Unauthenticated);

        info!(user_id = %current.id, "account deleted");
        Ok(())
    }

    /// Change the signed-in user's password, then sign out.
    ///
    /// The forced sign-out invalidates anything the surface may have
    /// cached about the old password; the user re-authenticates with the
    /// new one.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let current = self.current_user().ok_or(AuthError::NoSession)?;

        self.users
            .change_password(&current.id, current_password, new_password)
            .await?;

        info!(user_id = %current.id, "password changed, ending session");
        self.sign_out().await
    }

    /// Snapshot of the signed-in user, if any.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.user().cloned())
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or(AuthState::Loading)
    }

    fn set_state(&self, next: AuthState) {
        if let Ok(mut state) = self.state.write() {
            *state = next;
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────
