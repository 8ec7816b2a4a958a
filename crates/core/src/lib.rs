// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! haul-core: Shared library for the haul delivery sync system
//!
//! This crate provides the operation model, the bulk sync wire protocol, and
//! the resilient connection to the authoritative store. It is used by both
//! the `haul` device CLI and the `haul-remote` server.

pub mod error;
pub mod hlc;
pub mod operation;
pub mod protocol;
pub mod store;

pub use error::{Error, Result};
pub use hlc::{node_id_for, ClockSource, Hlc, HlcClock, SystemClock};
pub use operation::{
    CleaningData, DeliveryPayload, Method, OpId, OperationKind, Payload, PendingOperation,
    RefrigeratorStatus, RouteUpdatePayload, SalePayload, DEFAULT_UNIT_PRICE,
};
pub use protocol::{
    ApiResponse, BulkOperation, BulkResult, BulkSyncRequest, BulkSyncResponse, HealthReport,
    HealthStatus, API_KEY_HEADER, OPERATION_ID_HEADER,
};
pub use store::{
    is_connection_error, ConnectionState, Connector, QueryOutput, Record, RetryConfig,
    SqliteConnector, Statement, Store, StoreError, StoreResult, StoreStatus,
};
