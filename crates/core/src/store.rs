// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient connection to the authoritative store.
//!
//! [`Store`] owns a single SQLite connection behind an exclusive lock and
//! recovers from dropped or unopenable databases:
//!
//! - [`Store::connect`] retries with exponential backoff, then gives up in
//!   [`ConnectionState::Disconnected`]
//! - [`Store::execute`] reconnects and retries exactly once when a statement
//!   fails with a connection-class error
//! - [`Store::execute_transaction`] applies a list of statements all or nothing
//!
//! Connection-class failures surface as [`StoreError::Unavailable`]; anything
//! the database rejected on its merits surfaces as [`StoreError::Statement`].

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("statement failed: {0}")]
    Statement(rusqlite::Error),
}

impl StoreError {
    /// Sorts a driver error into the retryable or the application class.
    pub fn classify(err: rusqlite::Error) -> Self {
        if is_connection_error(&err) {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Statement(err)
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// True for errors that mean the connection itself is unusable.
pub fn is_connection_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::FileLockingProtocolFailed
        ),
        rusqlite::Error::InvalidPath(_) => true,
        _ => false,
    }
}

/// Opens new database connections.
pub trait Connector: Send + Sync {
    fn connect(&self) -> rusqlite::Result<Connection>;
}

impl<F> Connector for F
where
    F: Fn() -> rusqlite::Result<Connection> + Send + Sync,
{
    fn connect(&self) -> rusqlite::Result<Connection> {
        self()
    }
}

/// Connector for a SQLite database file.
///
/// Every new connection enables foreign keys, sets the busy timeout, and runs
/// the optional initialization script (typically `CREATE TABLE IF NOT EXISTS`).
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
    busy_timeout: Duration,
    init_sql: Option<String>,
}

impl SqliteConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConnector {
            path: path.into(),
            busy_timeout: Duration::from_millis(5000),
            init_sql: None,
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_init_sql(mut self, sql: impl Into<String>) -> Self {
        self.init_sql = Some(sql.into());
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        if let Some(sql) = &self.init_sql {
            conn.execute_batch(sql)?;
        }
        Ok(conn)
    }
}

/// Reconnect policy: `max_retries` attempts, waiting `base_delay * 2^n`
/// after failed attempt `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig { max_retries: 5, base_delay: Duration::from_secs(1) }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        RetryConfig { max_retries, base_delay }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// At least one attempt is always made.
    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub state: ConnectionState,
    pub last_ping: Option<DateTime<Utc>>,
}

/// A row keyed by column name.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Rows(Vec<Record>),
    Affected(usize),
}

impl QueryOutput {
    /// Rows changed; zero for a fetch.
    pub fn affected(&self) -> usize {
        match self {
            QueryOutput::Affected(n) => *n,
            QueryOutput::Rows(_) => 0,
        }
    }

    /// Fetched rows; empty for a write.
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            QueryOutput::Rows(rows) => rows,
            QueryOutput::Affected(_) => Vec::new(),
        }
    }
}

/// One statement of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Statement { sql: sql.into(), params }
    }
}

/// The connection slot. Holding its guard is the right to use or replace
/// the connection.
type Slot<'a> = MutexGuard<'a, Option<Connection>>;

/// The resilient store connection.
///
/// Statements and connect attempts are serialized on one exclusive lock over
/// the connection. A reconnect releases that lock while it waits out the
/// backoff; a statement arriving meanwhile fails fast as unavailable instead
/// of starting a second reconnect. Connection state is kept under its own
/// short-lived lock, so health reads never wait on a reconnect.
pub struct Store {
    connector: Box<dyn Connector>,
    retry: RetryConfig,
    conn: Mutex<Option<Connection>>,
    status: Mutex<StoreStatus>,
}

impl Store {
    /// Creates a store in the disconnected state. No connection is opened
    /// until [`Store::connect`] or the first statement.
    pub fn new(connector: impl Connector + 'static, retry: RetryConfig) -> Self {
        Store {
            connector: Box::new(connector),
            retry,
            conn: Mutex::new(None),
            status: Mutex::new(StoreStatus {
                state: ConnectionState::Disconnected,
                last_ping: None,
            }),
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Connects with backoff. Fails at once if another caller is already
    /// reconnecting.
    pub fn connect(&self) -> StoreResult<()> {
        let mut slot = self.conn.lock();
        if self.reconnecting() {
            return Err(reconnect_in_progress());
        }
        self.connect_locked(&mut slot)
    }

    fn connect_locked(&self, slot: &mut Slot<'_>) -> StoreResult<()> {
        self.set_state(ConnectionState::Connecting);
        let attempts = self.retry.attempts();
        let mut last_error = String::new();

        for attempt in 0..attempts {
            // Stale handle is closed before each attempt
            **slot = None;
            match self.connector.connect() {
                Ok(conn) => {
                    **slot = Some(conn);
                    *self.status.lock() = StoreStatus {
                        state: ConnectionState::Connected,
                        last_ping: Some(Utc::now()),
                    };
                    info!(attempt = attempt + 1, "store connected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, attempts, error = %e, "store connect failed");
                    last_error = e.to_string();
                    if attempt + 1 < attempts {
                        let delay = self.retry.delay_for_attempt(attempt);
                        MutexGuard::unlocked(slot, || thread::sleep(delay));
                    }
                }
            }
        }

        self.set_state(ConnectionState::Disconnected);
        Err(StoreError::Unavailable(format!(
            "gave up after {attempts} attempts: {last_error}"
        )))
    }

    /// Round-trips `SELECT 1`. Any failure reads as not alive.
    ///
    /// While the connection is busy with a statement or a connect attempt,
    /// answers from the last known state instead of waiting.
    pub fn is_alive(&self) -> bool {
        match self.conn.try_lock() {
            Some(mut slot) => self.check_alive(&mut slot),
            None => self.status().state == ConnectionState::Connected,
        }
    }

    fn check_alive(&self, slot: &mut Option<Connection>) -> bool {
        let alive = match slot.as_ref() {
            Some(conn) => conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok(),
            None => false,
        };
        if alive {
            self.status.lock().last_ping = Some(Utc::now());
        } else if slot.is_some() {
            debug!("store liveness check failed");
            self.drop_connection(slot);
        }
        alive
    }

    /// Checks the connection and reconnects if it is not alive.
    pub fn ensure_connection(&self) -> StoreResult<()> {
        let mut slot = self.conn.lock();
        self.ensure_locked(&mut slot)
    }

    fn ensure_locked(&self, slot: &mut Slot<'_>) -> StoreResult<()> {
        if self.check_alive(slot) {
            return Ok(());
        }
        if self.reconnecting() {
            return Err(reconnect_in_progress());
        }
        self.connect_locked(slot)
    }

    /// Runs `f` on a live connection. A connection-class error causes one
    /// reconnect and one more run of `f`; other errors return at once.
    pub(crate) fn with_connection<T>(
        &self,
        mut f: impl FnMut(&mut Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let mut slot = self.conn.lock();
        self.ensure_locked(&mut slot)?;

        let first = match slot.as_mut() {
            Some(conn) => f(conn),
            None => return Err(StoreError::Unavailable("no connection".to_string())),
        };
        let err = match first {
            Ok(value) => return Ok(value),
            Err(e) if is_connection_error(&e) => e,
            Err(e) => return Err(StoreError::Statement(e)),
        };

        warn!(error = %err, "connection lost during statement, reconnecting");
        self.drop_connection(&mut slot);
        self.connect_locked(&mut slot)?;

        let retried = match slot.as_mut() {
            Some(conn) => f(conn),
            None => return Err(StoreError::Unavailable("no connection".to_string())),
        };
        retried.map_err(|e| {
            if is_connection_error(&e) {
                self.drop_connection(&mut slot);
            }
            StoreError::classify(e)
        })
    }

    /// Executes one statement. With `fetch`, returns the rows; otherwise
    /// returns the number of rows changed.
    pub fn execute(&self, sql: &str, params: &[Value], fetch: bool) -> StoreResult<QueryOutput> {
        self.with_connection(|conn| run_statement(conn, sql, params, Some(fetch)))
    }

    /// Applies all statements in one transaction; commits only if every one
    /// succeeds. Statements returning columns produce `Rows`.
    ///
    /// Not retried: a failure rolls back and is reported to the caller.
    pub fn execute_transaction(&self, statements: &[Statement]) -> StoreResult<Vec<QueryOutput>> {
        let mut slot = self.conn.lock();
        self.ensure_locked(&mut slot)?;

        let result = match slot.as_mut() {
            Some(conn) => run_transaction(conn, statements),
            None => return Err(StoreError::Unavailable("no connection".to_string())),
        };
        result.map_err(|e| {
            if is_connection_error(&e) {
                self.drop_connection(&mut slot);
            }
            warn!(error = %e, statements = statements.len(), "transaction rolled back");
            StoreError::classify(e)
        })
    }

    /// Closes the connection, if any.
    pub fn close(&self) {
        let mut slot = self.conn.lock();
        if let Some(conn) = slot.take() {
            if let Err((_, e)) = conn.close() {
                warn!(error = %e, "error closing store connection");
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Current state and last successful liveness check. Never waits on a statement
    /// or a reconnect.
    pub fn status(&self) -> StoreStatus {
        *self.status.lock()
    }

    fn set_state(&self, state: ConnectionState) {
        self.status.lock().state = state;
    }

    fn reconnecting(&self) -> bool {
        self.status().state == ConnectionState::Connecting
    }

    fn drop_connection(&self, slot: &mut Option<Connection>) {
        *slot = None;
        self.set_state(ConnectionState::Disconnected);
    }
}

fn reconnect_in_progress() -> StoreError {
    StoreError::Unavailable("reconnect in progress".to_string())
}

fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &[Value],
    fetch: Option<bool>,
) -> rusqlite::Result<QueryOutput> {
    let mut stmt = conn.prepare(sql)?;
    let fetch = fetch.unwrap_or(stmt.column_count() > 0);

    if !fetch {
        return stmt.execute(params_from_iter(params.iter())).map(QueryOutput::Affected);
    }

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            let mut record = Record::new();
            for (i, name) in names.iter().enumerate() {
                record.insert(name.clone(), row.get::<_, Value>(i)?);
            }
            Ok(record)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(QueryOutput::Rows(rows))
}

fn run_transaction(
    conn: &mut Connection,
    statements: &[Statement],
) -> rusqlite::Result<Vec<QueryOutput>> {
    // Dropping the transaction without commit rolls it back.
    let tx = conn.transaction()?;
    let mut outputs = Vec::with_capacity(statements.len());
    for statement in statements {
        outputs.push(run_statement(&tx, &statement.sql, &statement.params, None)?);
    }
    tx.commit()?;
    Ok(outputs)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
