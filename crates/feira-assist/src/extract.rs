//! Best-effort JSON extraction from model text output.
//!
//! Models are asked for a bare JSON object but frequently wrap it in a
//! markdown fence or surrounding prose. The heuristic here mirrors what
//! works in practice: strip a fenced block if one exists, then take
//! everything from the first `{` to the last `}`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use feira_store::{NewItem, NewList};

use crate::error::{AssistError, AssistResult};

/// How much raw model text to carry inside parse errors.
const SAMPLE_LEN: usize = 200;

/// Fallback list name when the model supplies a blank one.
const FALLBACK_LIST_NAME: &str = "Lista da IA";

/// Fallback item name for entries missing one.
const FALLBACK_ITEM_NAME: &str = "Item";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("static fence pattern is valid")
});

// ═══════════════════════════════════════════════════════════════════════
//  Draft types
// ═══════════════════════════════════════════════════════════════════════

/// A normalized, ready-to-save list proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDraft {
    pub name: String,
    pub items: Vec<DraftItem>,
}

/// One proposed item, with all defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
}

impl From<ListDraft> for NewList {
    fn from(draft: ListDraft) -> Self {
        NewList {
            name: draft.name,
            items: draft
                .items
                .into_iter()
                .map(|item| NewItem {
                    name: item.name,
                    quantity: Some(item.quantity),
                    category: Some(item.category),
                })
                .collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Extraction pipeline
// ═══════════════════════════════════════════════════════════════════════

/// Pull the JSON object out of `text`, if there is one.
///
/// A fenced `json` block takes precedence; otherwise the span from the
/// first `{` to the last `}` is taken as-is.
pub fn extract_json(text: &str) -> Option<&str> {
    let candidate = match CODE_FENCE.captures(text) {
        Some(caps) => caps.get(1).map_or(text, |m| m.as_str()).trim(),
        None => text,
    };

    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&candidate[start..=end])
}

/// Parse and normalize model output into a [`ListDraft`].
pub fn parse_draft(text: &str) -> AssistResult<ListDraft> {
    let json = extract_json(text).ok_or_else(|| AssistError::ParseFailed {
        sample: sample(text),
    })?;

    let value: Value = serde_json::from_str(json).map_err(|_| AssistError::ParseFailed {
        sample: sample(text),
    })?;

    let name = value.get("listName").and_then(Value::as_str);
    let items = value.get("items").and_then(Value::as_array);
    let (Some(name), Some(items)) = (name, items) else {
        return Err(AssistError::InvalidStructure {
            sample: sample(text),
        });
    };

    Ok(normalize(name, items))
}

/// Apply the store's coercions: trimmed names with fallbacks, quantity of
/// at least 1, category defaulting to the store's catch-all.
fn normalize(name: &str, items: &[Value]) -> ListDraft {
    let name = non_empty(name).unwrap_or(FALLBACK_LIST_NAME).to_string();

    let items = items
        .iter()
        .map(|item| DraftItem {
            name: item
                .get("name")
                .and_then(Value::as_str)
                .and_then(non_empty)
                .unwrap_or(FALLBACK_ITEM_NAME)
                .to_string(),
            quantity: item
                .get("quantity")
                .and_then(coerce_quantity)
                .unwrap_or(1),
            category: item
                .get("category")
                .and_then(Value::as_str)
                .and_then(non_empty)
                .unwrap_or(feira_store::DEFAULT_CATEGORY)
                .to_string(),
        })
        .collect();

    ListDraft { name, items }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Accept integer or float quantities; anything unusable becomes `None`.
fn coerce_quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            let q = n.as_f64()?.round();
            if q >= 1.0 && q <= f64::from(u32::MAX) {
                Some(q as u32)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn sample(text: &str) -> String {
    text.chars().take(SAMPLE_LEN).collect()
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"listName":"Churrasco","items":[{"name":"Picanha","quantity":2,"category":"Carnes"}]}"#;

    #[test]
    fn extracts_bare_json() {
        assert_eq!(extract_json(BARE), Some(BARE));
    }

    #[test]
    fn extracts_from_json_fence() {
        let text = format!("```json\n{BARE}\n```");
        assert_eq!(extract_json(&text), Some(BARE));
    }

    #[test]
    fn extracts_from_anonymous_fence() {
        let text = format!("```\n{BARE}\n```");
        assert_eq!(extract_json(&text), Some(BARE));
    }

    #[test]
    fn extracts_from_surrounding_prose() {
        let text = format!("Claro! Aqui está sua lista:\n{BARE}\nBom apetite!");
        assert_eq!(extract_json(&text), Some(BARE));
    }

    #[test]
    fn no_braces_yields_none() {
        assert_eq!(extract_json("sem json aqui"), None);
    }

    #[test]
    fn parse_draft_happy_path() {
        let draft = parse_draft(BARE).unwrap();
        assert_eq!(draft.name, "Churrasco");
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].name, "Picanha");
        assert_eq!(draft.items[0].quantity, 2);
        assert_eq!(draft.items[0].category, "Carnes");
    }

    #[test]
    fn parse_draft_applies_defaults() {
        let text = r#"{"listName":"  Feira  ","items":[{"name":"  Alface "},{"quantity":3},{"name":"Sabão","quantity":0,"category":" "}]}"#;
        let draft = parse_draft(text).unwrap();

        assert_eq!(draft.name, "Feira");
        assert_eq!(draft.items[0].name, "Alface");
        assert_eq!(draft.items[0].quantity, 1);
        assert_eq!(draft.items[0].category, "Outros");
        assert_eq!(draft.items[1].name, "Item");
        assert_eq!(draft.items[1].quantity, 3);
        // Zero quantity is unusable and falls back to 1.
        assert_eq!(draft.items[2].quantity, 1);
        assert_eq!(draft.items[2].category, "Outros");
    }

    #[test]
    fn blank_list_name_falls_back() {
        let text = r#"{"listName":"","items":[]}"#;
        let draft = parse_draft(text).unwrap();
        assert_eq!(draft.name, "Lista da IA");
        assert!(draft.items.is_empty());
    }

    #[test]
    fn missing_list_name_is_invalid_structure() {
        let result = parse_draft(r#"{"items":[]}"#);
        assert!(matches!(result, Err(AssistError::InvalidStructure { .. })));
    }

    #[test]
    fn non_array_items_is_invalid_structure() {
        let result = parse_draft(r#"{"listName":"x","items":"Milk"}"#);
        assert!(matches!(result, Err(AssistError::InvalidStructure { .. })));
    }

    #[test]
    fn unparseable_json_is_parse_failure_with_sample() {
        let result = parse_draft("{broken json");
        match result {
            Err(AssistError::ParseFailed { sample }) => assert_eq!(sample, "{broken json"),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn error_sample_is_truncated() {
        let long = "x".repeat(500);
        match parse_draft(&long) {
            Err(AssistError::ParseFailed { sample }) => assert_eq!(sample.chars().count(), 200),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn draft_converts_to_new_list() {
        let draft = parse_draft(BARE).unwrap();
        let new_list: feira_store::NewList = draft.into();
        assert_eq!(new_list.name, "Churrasco");
        assert_eq!(new_list.items[0].quantity, Some(2));
        assert_eq!(new_list.items[0].category.as_deref(), Some("Carnes"));
    }
}
