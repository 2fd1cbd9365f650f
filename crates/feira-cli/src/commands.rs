//! Subcommand implementations.
//!
//! Auth-region commands (register/login) and app-region commands (lists,
//! generation, profile) are gated by the same route-guard rule the UI
//! screens follow: signed-out users are pointed at `login`, signed-in
//! users are kept out of the auth commands.

use anyhow::{bail, Context, Result};

use feira_assist::AssistClient;
use feira_auth::{route_redirect, AuthManager, Redirect, RouteRegion};
use feira_store::{
    clear_account_data, Item, KvStore, ListPatch, ListStore, NewItem, NewList, SessionUser,
    ShoppingList,
};

/// Environment variable holding the generative-language API key.
const API_KEY_VAR: &str = "GEMINI_API_KEY";

// ---------------------------------------------------------------------------
// Route guarding
// ---------------------------------------------------------------------------

/// App-region gate: bail with a sign-in hint when there is no session.
fn require_session(auth: &AuthManager) -> Result<SessionUser> {
    if route_redirect(&auth.state(), RouteRegion::App) == Some(Redirect::ToLogin) {
        bail!("you are signed out; run `feira login` first");
    }
    auth.current_user().context("session state not loaded")
}

/// Auth-region gate: bail when a session is already active.
fn require_signed_out(auth: &AuthManager) -> Result<()> {
    if route_redirect(&auth.state(), RouteRegion::Auth) == Some(Redirect::ToHome) {
        let user = auth.current_user().context("session state not loaded")?;
        bail!("already signed in as {}; run `feira logout` first", user.email);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Account commands
// ---------------------------------------------------------------------------

pub async fn register(auth: &AuthManager, name: &str, email: &str, password: &str) -> Result<()> {
    require_signed_out(auth)?;
    let user = auth.sign_up(name, email, password).await?;
    println!("welcome, {}! you are signed in as {}", user.name, user.email);
    Ok(())
}

pub async fn login(auth: &AuthManager, email: &str, password: &str) -> Result<()> {
    require_signed_out(auth)?;
    let user = auth.sign_in(email, password).await?;
    println!("signed in as {} ({})", user.name, user.email);
    Ok(())
}

pub async fn logout(auth: &AuthManager) -> Result<()> {
    auth.sign_out().await?;
    println!("signed out");
    Ok(())
}

pub fn whoami(auth: &AuthManager) -> Result<()> {
    let user = require_session(auth)?;
    println!("{} <{}> (since {})", user.name, user.email, user.created_at);
    Ok(())
}

pub async fn profile(auth: &AuthManager, name: &str, email: &str) -> Result<()> {
    require_session(auth)?;
    let user = auth.update_profile(name, email).await?;
    println!("profile updated: {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn password(auth: &AuthManager, current: &str, new: &str) -> Result<()> {
    require_session(auth)?;
    auth.update_password(current, new).await?;
    println!("password changed; sign in again with the new one");
    Ok(())
}

pub async fn delete_account(auth: &AuthManager) -> Result<()> {
    let user = require_session(auth)?;
    auth.delete_account().await?;
    println!("account {} deleted", user.email);
    Ok(())
}

// ---------------------------------------------------------------------------
// List commands
// ---------------------------------------------------------------------------

pub async fn lists(auth: &AuthManager, lists: &ListStore) -> Result<()> {
    require_session(auth)?;
    let all = lists.all().await?;
    if all.is_empty() {
        println!("no lists yet; try `feira add` or `feira generate`");
        return Ok(());
    }
    for list in &all {
        let done = list.items.iter().filter(|i| i.completed).count();
        println!(
            "{}  {} ({}/{} done)",
            list.id,
            list.name,
            done,
            list.items.len()
        );
    }
    Ok(())
}

pub async fn show(auth: &AuthManager, lists: &ListStore, list_id: &str) -> Result<()> {
    require_session(auth)?;
    let list = lists
        .get(list_id)
        .await?
        .with_context(|| format!("list not found: {list_id}"))?;
    print_list(&list);
    Ok(())
}

pub async fn add(auth: &AuthManager, lists: &ListStore, name: String, items: &[String]) -> Result<()> {
    require_session(auth)?;
    let items = items
        .iter()
        .map(|spec| parse_item_spec(spec))
        .collect::<Result<Vec<_>>>()?;

    let list = lists.save(NewList { name, items }).await?;
    println!("created {} ({} items)", list.id, list.items.len());
    Ok(())
}

pub async fn delete(auth: &AuthManager, lists: &ListStore, list_id: &str) -> Result<()> {
    require_session(auth)?;
    lists.delete(list_id).await?;
    println!("deleted {list_id}");
    Ok(())
}

pub async fn set_item_done(
    auth: &AuthManager,
    lists: &ListStore,
    list_id: &str,
    item_id: &str,
    done: bool,
) -> Result<()> {
    require_session(auth)?;
    let list = lists
        .get(list_id)
        .await?
        .with_context(|| format!("list not found: {list_id}"))?;

    let mut items = list.items;
    let item = items
        .iter_mut()
        .find(|i| i.id == item_id)
        .with_context(|| format!("item not found: {item_id}"))?;
    item.completed = done;
    let name = item.name.clone();

    lists
        .update(
            list_id,
            ListPatch {
                items: Some(items),
                ..Default::default()
            },
        )
        .await?;
    println!("{} {}", if done { "checked" } else { "unchecked" }, name);
    Ok(())
}

pub async fn item_add(
    auth: &AuthManager,
    lists: &ListStore,
    list_id: &str,
    name: String,
    quantity: Option<u32>,
    category: Option<String>,
) -> Result<()> {
    require_session(auth)?;
    let list = lists
        .get(list_id)
        .await?
        .with_context(|| format!("list not found: {list_id}"))?;

    let mut items = list.items;
    items.push(Item::new(name, quantity, category));

    let merged = lists
        .update(
            list_id,
            ListPatch {
                items: Some(items),
                ..Default::default()
            },
        )
        .await?;
    println!("{} now has {} items", merged.name, merged.items.len());
    Ok(())
}

pub async fn item_remove(
    auth: &AuthManager,
    lists: &ListStore,
    list_id: &str,
    item_id: &str,
) -> Result<()> {
    require_session(auth)?;
    let list = lists
        .get(list_id)
        .await?
        .with_context(|| format!("list not found: {list_id}"))?;

    let mut items = list.items;
    let before = items.len();
    items.retain(|i| i.id != item_id);
    if items.len() == before {
        bail!("item not found: {item_id}");
    }

    lists
        .update(
            list_id,
            ListPatch {
                items: Some(items),
                ..Default::default()
            },
        )
        .await?;
    println!("removed {item_id}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Assist commands
// ---------------------------------------------------------------------------

pub async fn generate(
    auth: &AuthManager,
    lists: &ListStore,
    description: &str,
    save: bool,
) -> Result<()> {
    require_session(auth)?;
    let client = assist_client()?;

    let draft = client.generate_list(description).await?;
    println!("{}", draft.name);
    for item in &draft.items {
        println!("  {} x{} [{}]", item.name, item.quantity, item.category);
    }

    if save {
        let list = lists.save(NewList::from(draft)).await?;
        println!("saved as {}", list.id);
    } else {
        println!("(dry run; pass --save to keep it)");
    }
    Ok(())
}

pub async fn models() -> Result<()> {
    let client = assist_client()?;
    for listing in client.list_models().await? {
        println!("version {}", listing.version);
        match listing.error {
            Some(error) => println!("  error: {error}"),
            None => {
                for model in &listing.models {
                    println!("  {model}");
                }
            }
        }
    }
    Ok(())
}

fn assist_client() -> Result<AssistClient> {
    let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
    AssistClient::new(api_key)
        .with_context(|| format!("set {API_KEY_VAR} in the environment or a .env file"))
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

pub async fn wipe(auth: &AuthManager, kv: &KvStore) -> Result<()> {
    clear_account_data(kv).await?;
    // The persisted slot is gone; drop the in-memory session too.
    auth.sign_out().await?;
    println!("accounts and session wiped (lists kept)");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_list(list: &ShoppingList) {
    println!("{} (created {})", list.name, list.created_at);
    for item in &list.items {
        println!(
            "  [{}] {}  {} x{} [{}]",
            if item.completed { "x" } else { " " },
            item.id,
            item.name,
            item.quantity,
            item.category
        );
    }
}

/// Parse an item spec: `name`, `name:qty`, or `name:qty:category`.
fn parse_item_spec(spec: &str) -> Result<NewItem> {
    let mut parts = spec.splitn(3, ':');
    let name = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .with_context(|| format!("empty item name in `{spec}`"))?;

    let quantity = match parts.next() {
        None => None,
        Some(raw) => Some(
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("bad quantity in `{spec}`"))?,
        ),
    };
    let category = parts.next().map(|c| c.trim().to_string());

    Ok(NewItem {
        name: name.to_string(),
        quantity,
        category,
    })
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_spec_name_only() {
        let item = parse_item_spec("Leite").unwrap();
        assert_eq!(item.name, "Leite");
        assert_eq!(item.quantity, None);
        assert_eq!(item.category, None);
    }

    #[test]
    fn item_spec_with_quantity() {
        let item = parse_item_spec("Leite:2").unwrap();
        assert_eq!(item.quantity, Some(2));
    }

    #[test]
    fn item_spec_with_quantity_and_category() {
        let item = parse_item_spec("Picanha:3:Carnes").unwrap();
        assert_eq!(item.name, "Picanha");
        assert_eq!(item.quantity, Some(3));
        assert_eq!(item.category.as_deref(), Some("Carnes"));
    }

    #[test]
    fn item_spec_bad_quantity_is_rejected() {
        assert!(parse_item_spec("Leite:muitos").is_err());
    }

    #[test]
    fn item_spec_empty_name_is_rejected() {
        assert!(parse_item_spec(":2").is_err());
    }
}
