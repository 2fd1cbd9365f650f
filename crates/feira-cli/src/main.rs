//! CLI entry point for feira.
//!
//! This binary stands in for the app's screens: every persistence, auth,
//! and assist operation is reachable as a subcommand, and the same
//! route-guard rule the screens follow decides which commands require a
//! signed-in session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use feira_auth::AuthManager;
use feira_store::{Database, KvStore, ListStore, SessionStore, UserStore};

mod commands;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// feira: AI-assisted shopping lists on your device.
#[derive(Parser)]
#[command(
    name = "feira",
    version,
    about = "feira: AI-assisted shopping lists on your device"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account (signs you in).
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in with email and password.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out of the current session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Edit the signed-in user's name and email.
    Profile { name: String, email: String },

    /// Change the signed-in user's password (signs you out).
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },

    /// Delete the signed-in user's account permanently.
    DeleteAccount,

    /// Show all shopping lists.
    Lists,

    /// Show one list with its items.
    Show { list_id: String },

    /// Create a list. Items are `name`, `name:qty`, or `name:qty:category`.
    Add {
        name: String,
        #[arg(value_name = "ITEM")]
        items: Vec<String>,
    },

    /// Delete a list.
    Delete { list_id: String },

    /// Mark an item as done.
    Check { list_id: String, item_id: String },

    /// Mark an item as not done.
    Uncheck { list_id: String, item_id: String },

    /// Add one item to an existing list.
    ItemAdd {
        list_id: String,
        name: String,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Remove one item from a list.
    ItemRemove { list_id: String, item_id: String },

    /// Generate a list draft from a description via the AI assistant.
    Generate {
        description: String,
        /// Persist the generated draft instead of only printing it.
        #[arg(long)]
        save: bool,
    },

    /// List the models available to the configured API key.
    Models,

    /// Wipe the session and all registered accounts (lists are kept).
    Wipe,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the API key can come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    let data_dir = std::env::var("FEIRA_DATA_DIR").unwrap_or_else(|_| "data".into());
    let data_dir = std::path::PathBuf::from(data_dir);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir).context("failed to create data directory")?;
    }

    let db = Database::open_and_migrate(data_dir.join("feira.db"))
        .await
        .context("failed to open database")?;
    let kv = KvStore::new(db);
    let lists = ListStore::new(kv.clone());
    let auth = AuthManager::new(UserStore::new(kv.clone()), SessionStore::new(kv.clone()));
    auth.load().await.context("failed to load session")?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::register(&auth, &name, &email, &password).await,
        Commands::Login { email, password } => commands::login(&auth, &email, &password).await,
        Commands::Logout => commands::logout(&auth).await,
        Commands::Whoami => commands::whoami(&auth),
        Commands::Profile { name, email } => commands::profile(&auth, &name, &email).await,
        Commands::Password { current, new } => commands::password(&auth, &current, &new).await,
        Commands::DeleteAccount => commands::delete_account(&auth).await,
        Commands::Lists => commands::lists(&auth, &lists).await,
        Commands::Show { list_id } => commands::show(&auth, &lists, &list_id).await,
        Commands::Add { name, items } => commands::add(&auth, &lists, name, &items).await,
        Commands::Delete { list_id } => commands::delete(&auth, &lists, &list_id).await,
        Commands::Check { list_id, item_id } => {
            commands::set_item_done(&auth, &lists, &list_id, &item_id, true).await
        }
        Commands::Uncheck { list_id, item_id } => {
            commands::set_item_done(&auth, &lists, &list_id, &item_id, false).await
        }
        Commands::ItemAdd {
            list_id,
            name,
            quantity,
            category,
        } => commands::item_add(&auth, &lists, &list_id, name, quantity, category).await,
        Commands::ItemRemove { list_id, item_id } => {
            commands::item_remove(&auth, &lists, &list_id, &item_id).await
        }
        Commands::Generate { description, save } => {
            commands::generate(&auth, &lists, &description, save).await
        }
        Commands::Models => commands::models().await,
        Commands::Wipe => commands::wipe(&auth, &kv).await,
    }
}
