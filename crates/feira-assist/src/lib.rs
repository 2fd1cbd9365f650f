//! # feira-assist
//!
//! AI-assisted list generation for the feira shopping-list app.
//!
//! A free-text description goes out to a generative-language API (trying
//! candidate models across API versions until one answers), and the
//! model's text reply comes back through a best-effort JSON extraction
//! pipeline as a normalized [`ListDraft`], ready to hand to
//! `feira_store::ListStore::save`.

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;

// ── re-exports ───────────────────────────────────────────────────────

pub use client::{AssistClient, ModelListing};
pub use error::{AssistError, AssistResult};
pub use extract::{extract_json, parse_draft, DraftItem, ListDraft};
pub use prompt::{build_prompt, CATEGORIES};
