//! # taskmaster
//!
//! Task tracker binary: `serve` runs the HTTP API over SQLite, `ui`
//! attaches the terminal task board to a running server.

#![deny(unsafe_code)]

mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskmaster_server::ServerConfig;
use taskmaster_store::{ConnectionConfig, TaskStore};

/// Minimal task tracker.
#[derive(Parser, Debug)]
#[command(name = "taskmaster", about = "Minimal task tracker: HTTP API plus terminal board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server.
    Serve {
        /// Host to bind (overrides TASKMASTER_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, 0 for auto-assign (overrides TASKMASTER_PORT).
        #[arg(long)]
        port: Option<u16>,

        /// Path to the SQLite database file (overrides TASKMASTER_DB_PATH).
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Open the interactive task board against a running server.
    Ui {
        /// Base URL of the API server.
        #[arg(long, default_value = taskmaster_client::DEFAULT_BASE_URL)]
        api_url: String,
    },
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".taskmaster").join("tasks.db")
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    match args.command {
        Commands::Serve {
            host,
            port,
            db_path,
        } => serve(host, port, db_path).await,
        Commands::Ui { api_url } => ui::run(&api_url).await,
    }
}

async fn serve(host: Option<String>, port: Option<u16>, db_path: Option<PathBuf>) -> Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(db_path) = db_path {
        config.db_path = Some(db_path);
    }

    let db_path = config.db_path.clone().unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;

    let store = TaskStore::open(&db_path.to_string_lossy(), &ConnectionConfig::default());
    match store.init_schema() {
        Ok(()) => tracing::info!(path = %db_path.display(), "database ready"),
        // Startup proceeds anyway; /health reports the database as
        // disconnected until it comes back.
        Err(e) => {
            tracing::warn!(error = %e, path = %db_path.display(), "database unavailable at startup");
        }
    }

    let handle = taskmaster_server::start(config, store)
        .await
        .context("Failed to bind server")?;
    tracing::info!(port = handle.port, "taskmaster ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down");
    handle.shutdown();
    Ok(())
}
