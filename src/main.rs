//! # workspace-rag CLI (`wrag`)
//!
//! The `wrag` binary keeps a local retrieval index of a workspace and
//! answers queries against it.
//!
//! ## Usage
//!
//! ```bash
//! wrag --config ./config/wrag.toml <command>
//! wrag --workspace /path/to/repo <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wrag init` | Create the SQLite database and run schema migrations |
//! | `wrag index` | Bring the index up to date with the workspace |
//! | `wrag search "<query>"` | Index, then print the top-K context block and citations |
//! | `wrag stats` | Show document/chunk counts and database size |
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr so
//! the context block on stdout stays clean.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use workspace_rag::config::{self, Config};
use workspace_rag::{search, sqlite_store::SqliteStore, stats};

/// workspace-rag: local, model-free semantic retrieval over a workspace.
#[derive(Parser)]
#[command(
    name = "wrag",
    about = "Local semantic retrieval over a workspace's text and code files",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Ignored when `--workspace` is given.
    #[arg(long, global = true, default_value = "./config/wrag.toml")]
    config: PathBuf,

    /// Use built-in defaults rooted at this directory instead of a config file.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Index new and changed files under the configured roots.
    Index,

    /// Retrieve the chunks most similar to a query.
    ///
    /// Runs an indexing pass first so results reflect the current workspace.
    Search {
        /// The query string.
        query: String,

        /// Maximum number of chunks to return (overrides `[retrieval].top_k`).
        #[arg(long)]
        limit: Option<usize>,

        /// Skip the indexing pass and query the index as it stands.
        #[arg(long)]
        no_index: bool,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show index statistics.
    Stats,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let cfg = match &cli.workspace {
        Some(root) => Config::for_workspace(root),
        None => config::load_config(&cli.config)?,
    };
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;

    match cli.command {
        Commands::Init => {
            let store = SqliteStore::open(&cfg).await?;
            store.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Index => {
            search::run_index(&cfg).await?;
        }
        Commands::Search {
            query,
            limit,
            no_index,
            json,
        } => {
            search::run_search(&cfg, &query, limit, no_index, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
