//! Shopping-list persistence.
//!
//! Lists live as a JSON array under a single key-value entry, like the
//! registered-users collection. Lists carry no owner field: the store is
//! device-local and assumes a single user per device, so every registered
//! account sees the same lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::kv::{KvStore, KEY_LISTS};

/// Category assigned to items that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Outros";

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// A stored shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    /// Unique identifier (UUID v7).
    pub id: String,
    /// User-given or AI-suggested list name.
    pub name: String,
    /// Items in insertion order. Each item belongs to exactly one list.
    pub items: Vec<Item>,
    /// When the list was created.
    pub created_at: DateTime<Utc>,
    /// Legacy whole-list flag; kept for blob compatibility, unused by the
    /// screens that track per-item completion.
    pub completed: bool,
}

/// A single entry in a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (UUID v7) within the containing list.
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub completed: bool,
}

impl Item {
    /// Build a fresh unchecked item, applying quantity/category defaults.
    pub fn new(name: impl Into<String>, quantity: Option<u32>, category: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            quantity: quantity.unwrap_or(1),
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.into()),
            completed: false,
        }
    }
}

/// Input for creating a list. Ids, timestamps, and completion flags are
/// assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewList {
    pub name: String,
    pub items: Vec<NewItem>,
}

/// Input for a single item of a [`NewList`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub name: String,
    /// Defaults to 1 when absent.
    pub quantity: Option<u32>,
    /// Defaults to [`DEFAULT_CATEGORY`] when absent.
    pub category: Option<String>,
}

/// A shallow-merge patch for a stored list.
///
/// Present fields replace the stored top-level field wholesale; in
/// particular an `items` patch must carry the complete item sequence.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub name: Option<String>,
    pub items: Option<Vec<Item>>,
    pub completed: Option<bool>,
}

// ═══════════════════════════════════════════════════════════════════════
//  ListStore
// ═══════════════════════════════════════════════════════════════════════

/// CRUD operations on the shopping-lists collection.
#[derive(Clone)]
pub struct ListStore {
    kv: KvStore,
}

impl ListStore {
    /// Create a list store backed by `kv`.
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// All lists in insertion order.
    #[instrument(skip(self))]
    pub async fn all(&self) -> StoreResult<Vec<ShoppingList>> {
        let raw = self.kv.get(KEY_LISTS).await?;
        decode_lists(raw)
    }

    /// Create and persist a list from caller input.
    ///
    /// Assigns fresh ids to the list and every item, stamps the creation
    /// time, forces `completed: false` on the list and each item, and
    /// fills in quantity/category defaults.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn save(&self, input: NewList) -> StoreResult<ShoppingList> {
        let list = ShoppingList {
            id: Uuid::now_v7().to_string(),
            name: input.name,
            items: input.items.into_iter().map(materialize_item).collect(),
            created_at: Utc::now(),
            completed: false,
        };

        let stored = list.clone();
        self.kv
            .update(KEY_LISTS, move |raw| {
                let mut lists = decode_lists(raw)?;
                lists.push(stored);
                Ok(Some(encode_lists(&lists)?))
            })
            .await?;

        debug!(list_id = %list.id, items = list.items.len(), "list saved");
        Ok(list)
    }

    /// Shallow-merge a patch into a stored list and return the result.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: ListPatch) -> StoreResult<ShoppingList> {
        let id_owned = id.to_string();
        let merged = self
            .kv
            .update_returning(KEY_LISTS, move |raw| {
                let mut lists = decode_lists(raw)?;
                let index = lists
                    .iter()
                    .position(|l| l.id == id_owned)
                    .ok_or(StoreError::ListNotFound { id: id_owned })?;

                let list = &mut lists[index];
                if let Some(name) = patch.name {
                    list.name = name;
                }
                if let Some(items) = patch.items {
                    list.items = items;
                }
                if let Some(completed) = patch.completed {
                    list.completed = completed;
                }
                let merged = list.clone();
                Ok((Some(encode_lists(&lists)?), merged))
            })
            .await?;

        debug!(list_id = %merged.id, "list updated");
        Ok(merged)
    }

    /// Delete a list by id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let id_owned = id.to_string();
        self.kv
            .update(KEY_LISTS, move |raw| {
                let mut lists = decode_lists(raw)?;
                let before = lists.len();
                lists.retain(|l| l.id != id_owned);
                if lists.len() == before {
                    return Err(StoreError::ListNotFound { id: id_owned });
                }
                Ok(Some(encode_lists(&lists)?))
            })
            .await?;

        debug!(list_id = %id, "list deleted");
        Ok(())
    }

    /// Fetch a single list by id, or `None` if absent.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> StoreResult<Option<ShoppingList>> {
        let lists = self.all().await?;
        Ok(lists.into_iter().find(|l| l.id == id))
    }
}

/// Turn caller input into a stored item, applying defaults.
fn materialize_item(input: NewItem) -> Item {
    Item::new(input.name, input.quantity, input.category)
}

// ── blob codec ───────────────────────────────────────────────────────

fn decode_lists(raw: Option<String>) -> StoreResult<Vec<ShoppingList>> {
    match raw {
        None => Ok(Vec::new()),
        Some(blob) => serde_json::from_str(&blob).map_err(|e| StoreError::Corrupted {
            key: KEY_LISTS,
            message: e.to_string(),
        }),
    }
}

fn encode_lists(lists: &[ShoppingList]) -> StoreResult<String> {
    Ok(serde_json::to_string(lists)?)
}

// ── tests ────────────────────────────────────────────────────────────
