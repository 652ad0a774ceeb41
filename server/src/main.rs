//! MedLedger audit ledger service — HTTP server.
//!
//! Serves the audit ledger behind the observed client contract: log
//! listing, the unified add-log write path, modify/delete by entry id,
//! chain validation, chat, and the login/register identity boundary.
//!
//! Usage:
//!   medledger-server
//!   medledger-server --config medledger.toml
//!   medledger-server --bind 0.0.0.0:9000 --data data/ledger.jsonl

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use medledger_contracts::{LedgerError, LedgerResult};
use medledger_core::LedgerStore;
use medledger_store::{FileLedger, MemoryLedger};

mod auth;
mod config;
mod error;
mod routes;
mod state;

use config::ServerConfig;
use state::AppState;

// ── CLI definition ────────────────────────────────────────────────────────────

/// MedLedger — tamper-evident audit ledger for EHR actions.
#[derive(Parser)]
#[command(
    name = "medledger-server",
    about = "MedLedger audit ledger HTTP service",
    long_about = "Serves the hash-chained EHR audit ledger: role-scoped log reads,\n\
                  validated lifecycle writes, analytics, and keyword chat."
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured ledger file path.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Run on the in-memory store even if a data path is configured.
    #[arg(long)]
    in_memory: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("medledger-server error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> LedgerResult<()> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(data) = cli.data {
        config.data_path = Some(data);
    }
    if cli.in_memory {
        config.data_path = None;
    }

    let store: Arc<dyn LedgerStore> = match &config.data_path {
        Some(path) => {
            info!(path = %path.display(), "using file-backed ledger");
            Arc::new(FileLedger::open(path)?)
        }
        None => {
            info!("using in-memory ledger (entries die with the process)");
            Arc::new(MemoryLedger::new())
        }
    };

    // A chain audit on startup: refuse to serve a tampered ledger silently.
    store.verify_chain()?;

    let state = AppState::new(store);
    let app = routes::router(state, &config.cors_origin)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| LedgerError::Config {
            reason: format!("cannot bind '{}': {e}", config.bind),
        })?;

    info!(bind = %config.bind, "medledger-server listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("server error: {e}"),
        })
}
