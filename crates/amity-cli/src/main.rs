//! amity - command-line client for the Amity social core.
//!
//! Every invocation logs in as the configured actor against the local SQLite
//! store, runs one command and logs out again.

use std::path::PathBuf;
use std::sync::Arc;

use amity_client::Client;
use amity_shared::constants::APP_NAME;
use amity_shared::Actor;
use amity_store::Database;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

mod commands;
mod config;

/// amity - friends, messages and profiles over a shared object store
#[derive(Parser, Debug)]
#[command(name = "amity")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database (overrides AMITY_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Actor id to act as (overrides AMITY_ACTOR)
    #[arg(short, long)]
    actor: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current actor and profile
    Whoami,

    // === Friends ===
    /// List friends, incoming and outgoing requests
    Friends,

    /// Send a friend request
    Add { peer: String },

    /// Accept an incoming friend request
    Accept { peer: String },

    /// Reject an incoming friend request
    Reject { peer: String },

    /// Cancel a friend request you sent
    Cancel { peer: String },

    /// Remove a friend
    Remove { peer: String },

    // === Messages ===
    /// Send a message to a peer
    Send { peer: String, text: String },

    /// List the conversation with a peer
    Messages { peer: String },

    /// Edit one of your messages
    Edit {
        peer: String,
        url: String,
        text: String,
    },

    /// Delete one of your messages
    Delete { peer: String, url: String },

    // === Profile ===
    /// Show a profile (yours by default)
    Profile { actor: Option<String> },

    /// Update your profile
    SetProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        pronouns: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        /// Image file to use as profile picture
        #[arg(long, conflicts_with = "remove_picture")]
        picture: Option<PathBuf>,

        /// Clear the profile picture
        #[arg(long)]
        remove_picture: bool,
    },

    // === Mood ===
    /// Show moods in a conversation, or set yours
    Mood { peer: String, emoji: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::from_env().with_overrides(cli.db, cli.actor, cli.log_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let actor = config
        .actor
        .clone()
        .map(Actor::from)
        .context("no actor configured: pass --actor or set AMITY_ACTOR")?;

    let db_path = config.resolve_db_path()?;
    let db = Database::open_at(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    info!(path = %db_path.display(), actor = %actor, "starting {APP_NAME}");

    let mut client = Client::new(Arc::new(db));
    client.login(&actor).await.context("login failed")?;

    let outcome = commands::run(&mut client, cli.command, cli.json).await;

    if let Err(e) = client.logout().await {
        tracing::warn!(error = %e, "logout failed");
    }
    outcome
}
