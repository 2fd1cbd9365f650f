//! # feira-store
//!
//! Device-local persistence for the feira shopping-list app.
//!
//! Three logical collections live as JSON blobs under fixed keys in a
//! single SQLite-backed key-value table: the signed-in session user, the
//! registered-users array, and the shopping-lists array. Every mutation
//! rewrites its collection's whole blob inside one serialized
//! read-modify-write cycle.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  UserStore / SessionStore / ListStore        │
//! │  (collection CRUD over JSON blobs)           │
//! ├──────────────────────────────────────────────┤
//! │  KvStore (get/set/remove/multi_remove)       │
//! ├──────────────────────────────────────────────┤
//! │  Database (rusqlite WAL, blocking pool)      │
//! │  Migrations (versioned, transactional)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use feira_store::{Database, KvStore, UserStore, ListStore};
//!
//! let db = Database::open_and_migrate("data/feira.db").await?;
//! let kv = KvStore::new(db);
//! let users = UserStore::new(kv.clone());
//! let lists = ListStore::new(kv);
//! ```

pub mod db;
pub mod error;
pub mod kv;
pub mod list_store;
pub mod migration;
pub mod session_store;
pub mod user_store;

// ── re-exports ───────────────────────────────────────────────────────

pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use kv::{clear_account_data, KvStore, KEY_LISTS, KEY_SESSION, KEY_USERS};
pub use list_store::{
    Item, ListPatch, ListStore, NewItem, NewList, ShoppingList, DEFAULT_CATEGORY,
};
pub use session_store::SessionStore;
pub use user_store::{ProfileUpdate, SessionUser, User, UserStore, MIN_PASSWORD_LEN};
