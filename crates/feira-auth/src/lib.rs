//! # feira-auth
//!
//! Session management for the feira shopping-list app.
//!
//! [`AuthManager`] owns the signed-in user's identity for the app's
//! lifetime, backed by `feira-store`: sign-in, registration with
//! auto-login, profile and password edits, sign-out, and account
//! deletion. The [`guard`] module carries the two-region navigation rule
//! any UI surface must enforce.

pub mod error;
pub mod guard;
pub mod manager;

// ── re-exports ───────────────────────────────────────────────────────

pub use error::{AuthError, AuthResult};
pub use guard::{route_redirect, Redirect, RouteRegion};
pub use manager::{AuthManager, AuthState};
