// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration from flags, `HAUL_*` environment variables, and `.env`.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use haul_core::{RetryConfig, SqliteConnector, Store};

use crate::schema::SCHEMA;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max bulk items must be greater than 0")]
    ZeroBulkLimit,

    #[error("api key must not be empty\n  hint: unset HAUL_API_KEY to disable the check")]
    EmptyApiKey,
}

/// haul-remote: sync server for haul delivery devices
#[derive(Parser, Debug, Clone)]
#[command(name = "haul-remote", version, about = "HTTP sync server for haul delivery devices")]
pub struct ServerArgs {
    /// Address to bind the server to
    #[arg(short, long, env = "HAUL_BIND", default_value = "0.0.0.0:7890")]
    pub bind: SocketAddr,

    /// Path to the SQLite database file
    #[arg(short, long, env = "HAUL_DATABASE", default_value = "haul.db")]
    pub database: PathBuf,

    /// Maximum number of operations accepted in one bulk request
    #[arg(long, env = "HAUL_MAX_BULK_ITEMS", default_value_t = 500)]
    pub max_bulk_items: usize,

    /// Connection attempts before the store is reported unavailable
    #[arg(long, env = "HAUL_CONNECT_RETRIES", default_value_t = 5)]
    pub connect_retries: u32,

    /// Delay before the second connection attempt; doubles each attempt
    #[arg(long, env = "HAUL_RETRY_BASE_DELAY_MS", default_value_t = 1000)]
    pub retry_base_delay_ms: u64,

    /// How long a statement waits on a locked database
    #[arg(long, env = "HAUL_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Shared key devices must send in the `x-api-key` header
    #[arg(long, env = "HAUL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: PathBuf,
    pub max_bulk_items: usize,
    pub retry: RetryConfig,
    pub busy_timeout: Duration,
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Defaults for a database at `path`, bound to an ephemeral local port.
    pub fn for_database(path: impl Into<PathBuf>) -> Self {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            database: path.into(),
            max_bulk_items: 500,
            retry: RetryConfig::default(),
            busy_timeout: Duration::from_millis(5000),
            api_key: None,
        }
    }

    /// Builds the (not yet connected) store for the configured database.
    pub fn open_store(&self) -> Store {
        let connector = SqliteConnector::new(&self.database)
            .with_busy_timeout(self.busy_timeout)
            .with_init_sql(SCHEMA);
        Store::new(connector, self.retry)
    }
}

impl TryFrom<ServerArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        if args.max_bulk_items == 0 {
            return Err(ConfigError::ZeroBulkLimit);
        }
        if args.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyApiKey);
        }

        Ok(ServerConfig {
            bind: args.bind,
            database: args.database,
            max_bulk_items: args.max_bulk_items,
            retry: RetryConfig::new(
                args.connect_retries,
                Duration::from_millis(args.retry_base_delay_ms),
            ),
            busy_timeout: Duration::from_millis(args.busy_timeout_ms),
            api_key: args.api_key,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
