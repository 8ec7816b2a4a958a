// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared server state.
//!
//! Wraps the store and configuration for access from request handlers.

use std::sync::Arc;
use tokio::task::JoinError;

use haul_core::Store;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<Store>,
    config: ServerConfig,
}

impl AppState {
    pub fn new(store: Store, config: ServerConfig) -> Self {
        AppState { inner: Arc::new(AppStateInner { store: Arc::new(store), config }) }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Runs store work on the blocking pool.
    ///
    /// Store calls hold the connection lock and may sleep through reconnect
    /// backoff, so they never run on the async workers.
    pub async fn run_blocking<T, F>(&self, f: F) -> Result<T, JoinError>
    where
        F: FnOnce(&Store) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.inner.store);
        tokio::task::spawn_blocking(move || f(&store)).await
    }
}
