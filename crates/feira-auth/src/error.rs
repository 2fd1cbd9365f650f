//! Auth error types.
//!
//! Domain failures from the persistence layer are re-surfaced as their own
//! variants so callers can render precise one-line messages; everything
//! else (I/O, corruption, task failures) stays wrapped as a store error.

use feira_store::StoreError;
use thiserror::Error;

/// Alias for `Result<T, AuthError>`.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors surfaced by the session manager.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No registered user matches the given email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Another registered user already has this email.
    #[error("email already registered: {email}")]
    DuplicateEmail { email: String },

    /// The canonical record for this operation no longer exists.
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// A new password failed the minimum-length policy.
    #[error("password must have at least {min} characters")]
    PasswordTooShort { min: usize },

    /// The operation requires a signed-in user.
    #[error("no active session")]
    NoSession,

    /// The persistence layer failed.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidCredentials => Self::InvalidCredentials,
            StoreError::DuplicateEmail { email } => Self::DuplicateEmail { email },
            StoreError::UserNotFound { id } => Self::UserNotFound { id },
            StoreError::PasswordTooShort { min } => Self::PasswordTooShort { min },
            other => Self::Store(other),
        }
    }
}
