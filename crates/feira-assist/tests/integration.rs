//! Integration tests for the feira-assist crate.
//!
//! The extraction pipeline is exercised against response texts shaped
//! like real model replies (clean JSON, fenced JSON, and chatty prose)
//! through to a draft the store can persist.

use feira_assist::{parse_draft, AssistError, ListDraft};
use feira_store::{Database, KvStore, ListStore, NewList};

const CLEAN_REPLY: &str = r#"{
  "listName": "Churrasco para 10 pessoas",
  "items": [
    { "name": "Picanha", "quantity": 3, "category": "Carnes" },
    { "name": "Pão de alho", "quantity": 4, "category": "Padaria" },
    { "name": "Refrigerante", "quantity": 6, "category": "Bebidas" },
    { "name": "Carvão", "quantity": 2 }
  ]
}"#;

fn fenced_reply() -> String {
    format!("```json\n{CLEAN_REPLY}\n```")
}

fn chatty_reply() -> String {
    format!("Claro! Aqui está a lista que você pediu:\n\n{CLEAN_REPLY}\n\nBoas compras!")
}

fn assert_churrasco(draft: &ListDraft) {
    assert_eq!(draft.name, "Churrasco para 10 pessoas");
    assert_eq!(draft.items.len(), 4);
    assert_eq!(draft.items[0].name, "Picanha");
    assert_eq!(draft.items[0].quantity, 3);
    assert_eq!(draft.items[0].category, "Carnes");
    // Missing category falls back to the store default.
    assert_eq!(draft.items[3].category, "Outros");
}

#[test]
fn clean_reply_parses() {
    assert_churrasco(&parse_draft(CLEAN_REPLY).unwrap());
}

#[test]
fn fenced_reply_parses() {
    assert_churrasco(&parse_draft(&fenced_reply()).unwrap());
}

#[test]
fn chatty_reply_parses() {
    assert_churrasco(&parse_draft(&chatty_reply()).unwrap());
}

#[test]
fn refusal_reply_fails_with_sample() {
    let result = parse_draft("Desculpe, não posso gerar essa lista.");
    match result {
        Err(AssistError::ParseFailed { sample }) => {
            assert!(sample.starts_with("Desculpe"));
        }
        other => panic!("expected ParseFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn generated_draft_saves_through_the_store() {
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().await.unwrap();
    let lists = ListStore::new(KvStore::new(db));

    let draft = parse_draft(&fenced_reply()).unwrap();
    let saved = lists.save(NewList::from(draft)).await.unwrap();

    assert_eq!(saved.name, "Churrasco para 10 pessoas");
    assert_eq!(saved.items.len(), 4);
    assert!(!saved.completed);
    assert!(saved.items.iter().all(|i| !i.completed));
    assert_eq!(saved.items[3].category, "Outros");
    assert_eq!(saved.items[3].quantity, 2);
}
