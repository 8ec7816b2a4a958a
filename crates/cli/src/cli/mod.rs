// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::sync::SyncMode;

pub use args::{DeliveryArgs, FridgeStatus, RouteArgs, SaleArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Sync mode as accepted on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    #[default]
    #[value(name = "per_item", alias = "per-item")]
    PerItem,
    Bulk,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerItem => SyncMode::PerItem,
            ModeArg::Bulk => SyncMode::Bulk,
        }
    }
}

#[derive(Parser)]
#[command(name = "haul")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record deliveries offline and sync them when the server is reachable")]
#[command(
    long_about = "Record deliveries, sales and route updates offline.\n\n\
    Every write lands in a durable local queue first; `haul sync` sends it to the server \
    and removes only what the server acknowledged."
)]
pub struct Cli {
    /// Run as if haul was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Set up this device
    #[command(after_help = "\
Examples:
  haul init --server-url http://depot:7890 --device-id truck-7
  haul init --server-url http://depot:7890 --device-id truck-7 --mode bulk")]
    Init {
        /// Base URL of the sync server
        #[arg(long, value_parser = non_empty_string)]
        server_url: String,

        /// Stable name for this device
        #[arg(long, value_parser = non_empty_string)]
        device_id: String,

        /// How queued operations are sent
        #[arg(long, value_enum, default_value_t)]
        mode: ModeArg,

        /// Shared key sent with every request
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Queue a delivery stop
    #[command(after_help = "\
Examples:
  haul delivery --customer c-12 --worker ana --route r-3 --bags 10 --total 150
  haul delivery --customer c-12 --worker ana --route r-3 --bags 8 --merma 1 \\
    --total 120 --fridge needs_cleaning --cleaned --cleaning-notes \"wiped shelves\"")]
    Delivery(DeliveryArgs),

    /// Queue a sale
    Sale(SaleArgs),

    /// Queue a route update
    #[command(after_help = "\
Examples:
  haul route r-3 --status completed
  haul route r-3 --assign u-42 --name \"North loop\"")]
    Route(RouteArgs),

    /// Queue a raw operation given as JSON
    #[command(after_help = "\
Kinds: create_delivery, create_sale, update_route

Examples:
  haul enqueue create_sale '{\"customer_id\":\"c-12\",\"worker_username\":\"ana\",\"bags_delivered\":4}'")]
    Enqueue {
        /// Operation kind
        kind: String,

        /// Operation payload as a JSON object
        data: String,
    },

    /// Send queued operations to the server
    Sync {
        /// Operator-initiated sync: runs even after automatic retries are spent
        #[arg(long)]
        manual: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queued operations and retry state
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
