//! Error types for the feira-store crate.
//!
//! All storage operations return [`StoreError`] via [`StoreResult`].
//! Uses `thiserror` for ergonomic, zero-cost error definitions.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A schema migration failed.
    #[error("migration v{version} failed: {message}")]
    Migration { version: u32, message: String },

    /// A stored collection blob could not be decoded.
    ///
    /// Surfaced instead of silently returning an empty collection so that
    /// on-device corruption is visible rather than masked as data loss.
    #[error("corrupted data under key `{key}`: {message}")]
    Corrupted { key: &'static str, message: String },

    /// Another registered user already has this email.
    #[error("email already registered: {email}")]
    DuplicateEmail { email: String },

    /// No registered user matches the given email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// No registered user with this id.
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// No shopping list with this id.
    #[error("list not found: {id}")]
    ListNotFound { id: String },

    /// A new password failed the minimum-length policy.
    #[error("password must have at least {min} characters")]
    PasswordTooShort { min: usize },

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
