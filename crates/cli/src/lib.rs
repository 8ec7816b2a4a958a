// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! haulrs - the device side of haul, an offline-first delivery recorder.
//!
//! This crate provides the functionality behind the `haul` CLI: operations
//! are recorded into a durable local queue and later flushed to the
//! `haul-remote` server, with bounded automatic retries and escalation to a
//! manual sync.
//!
//! # Main Components
//!
//! - [`sync::OfflineQueue`] - durable, process-shared operation queue
//! - [`sync::SyncClient`] - flushes the queue per item or in bulk
//! - [`Config`] - device configuration (`.haul/config.toml`)
//! - [`Error`] - error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use haulrs::sync::{SyncClient, SyncConfig};
//!
//! let client = SyncClient::new(SyncConfig::new("http://depot:7890", "truck-7"), data_dir)?;
//! client.queue().enqueue(&payload)?;
//! let report = client.flush(false).await?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{
    Cli, Command, DeliveryArgs, FridgeStatus, ModeArg, OutputFormat, RouteArgs, SaleArgs,
};
pub use config::{find_data_dir, init_data_dir, Config};
pub use error::{Error, Result};

use commands::Device;

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = match cli.directory {
        Some(dir) => cwd.join(dir),
        None => cwd,
    };

    let device = || Device::open(&root);

    match cli.command {
        Command::Init { server_url, device_id, mode, api_key } => {
            commands::init::run(&root, server_url, device_id, mode.into(), api_key)
        }
        Command::Delivery(args) => commands::record::run(&device()?, args.into_payload()),
        Command::Sale(args) => commands::record::run(&device()?, args.into_payload()),
        Command::Route(args) => commands::record::run(&device()?, args.into_payload()),
        Command::Enqueue { kind, data } => commands::record::run_raw(&device()?, &kind, &data),
        Command::Sync { manual, output } => commands::sync::run(&device()?, manual, output),
        Command::Status { output } => commands::status::run(&device()?, output),
    }
}
