//! Integration tests for the feira-auth crate.
//!
//! These exercise the full session lifecycle against a real on-disk
//! database, including the restart path (session restored by `load`).

use feira_auth::{route_redirect, AuthManager, AuthState, Redirect, RouteRegion};
use feira_store::{Database, KvStore, SessionStore, UserStore, KEY_SESSION};

async fn manager_for(db: Database) -> AuthManager {
    let kv = KvStore::new(db);
    AuthManager::new(UserStore::new(kv.clone()), SessionStore::new(kv))
}

#[tokio::test]
async fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("feira.db");

    {
        let db = Database::open_and_migrate(db_path.clone()).await.unwrap();
        let auth = manager_for(db).await;
        auth.load().await.unwrap();
        auth.sign_up("Ana", "ana@x.com", "abcdef").await.unwrap();
    }

    // "Restart": a fresh manager over the same database restores the session.
    let db = Database::open_and_migrate(db_path).await.unwrap();
    let auth = manager_for(db).await;

    let state = auth.load().await.unwrap();
    match state {
        AuthState::Authenticated(user) => {
            assert_eq!(user.name, "Ana");
            assert_eq!(user.email, "ana@x.com");
        }
        other => panic!("expected Authenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn corrupted_session_slot_degrades_to_unauthenticated() {
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().await.unwrap();
    let kv = KvStore::new(db);
    kv.set(KEY_SESSION, "{not valid json".into()).await.unwrap();

    let auth = AuthManager::new(UserStore::new(kv.clone()), SessionStore::new(kv));

    // A damaged session slot must never lock the user out of sign-in.
    assert_eq!(auth.load().await.unwrap(), AuthState::Unauthenticated);
    assert_eq!(
        route_redirect(&auth.state(), RouteRegion::App),
        Some(Redirect::ToLogin)
    );
}

#[tokio::test]
async fn register_scenario_session_has_no_password_canonical_does() {
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().await.unwrap();
    let kv = KvStore::new(db);
    let users = UserStore::new(kv.clone());
    let auth = AuthManager::new(users.clone(), SessionStore::new(kv));

    auth.load().await.unwrap();
    let session = auth.sign_up("Ana", "ana@x.com", "abcdef").await.unwrap();

    // Session projection: id, name, email, createdAt, and nothing else.
    let blob = serde_json::to_value(&session).unwrap();
    assert!(blob.get("password").is_none());
    assert_eq!(blob["name"], "Ana");
    assert_eq!(blob["email"], "ana@x.com");
    assert!(blob.get("id").is_some());
    assert!(blob.get("createdAt").is_some());

    // The canonical record still carries the password.
    let stored = &users.all().await.unwrap()[0];
    assert_eq!(stored.password, "abcdef");
    assert_eq!(stored.id, session.id);
}

#[tokio::test]
async fn guard_follows_the_session_lifecycle() {
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().await.unwrap();
    let auth = manager_for(db).await;

    // Before load: stay put everywhere.
    assert_eq!(route_redirect(&auth.state(), RouteRegion::App), None);

    auth.load().await.unwrap();
    assert_eq!(
        route_redirect(&auth.state(), RouteRegion::App),
        Some(Redirect::ToLogin)
    );

    auth.sign_up("Ana", "ana@x.com", "abcdef").await.unwrap();
    assert_eq!(
        route_redirect(&auth.state(), RouteRegion::Auth),
        Some(Redirect::ToHome)
    );
    assert_eq!(route_redirect(&auth.state(), RouteRegion::App), None);

    auth.sign_out().await.unwrap();
    assert_eq!(
        route_redirect(&auth.state(), RouteRegion::App),
        Some(Redirect::ToLogin)
    );
}
