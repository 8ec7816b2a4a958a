// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! haul-remote: HTTP sync server for haul delivery devices.
//!
//! The server owns the authoritative store. Devices push queued operations
//! one at a time or as bulk batches; each batch item is applied in isolation
//! and reported back individually.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod schema;
pub mod server;
pub mod state;

pub use config::{ConfigError, ServerArgs, ServerConfig};
pub use dispatch::{dispatch, dispatch_to_store, DispatchError};
pub use handlers::{handler_for, Handler, HandlerError, HandlerResult};
pub use state::AppState;

#[cfg(test)]
mod test_helpers;
