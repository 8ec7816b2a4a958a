// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! haul-remote: HTTP sync server for haul delivery devices.
//!
//! Owns the authoritative store. A store that cannot be reached at startup
//! does not stop the server; it starts degraded and reconnects on demand.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use haul_remote::{server, AppState, ServerArgs, ServerConfig};

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = ServerArgs::parse();
    setup_logging(args.verbose);

    let config = ServerConfig::try_from(args)?;
    info!("Starting haul-remote server");
    info!("  Bind address: {}", config.bind);
    info!("  Database: {}", config.database.display());
    info!("  Max bulk items: {}", config.max_bulk_items);
    info!("  API key: {}", if config.api_key.is_some() { "required" } else { "disabled" });

    let store = config.open_store();
    let store = tokio::task::spawn_blocking(move || {
        if let Err(e) = store.connect() {
            warn!(error = %e, "store unreachable, starting in degraded mode");
        }
        store
    })
    .await?;

    let listener = TcpListener::bind(config.bind).await?;
    let state = AppState::new(store, config);
    server::run(listener, state).await?;

    Ok(())
}
