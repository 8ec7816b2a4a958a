// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for talking to the sync server.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP calls for production ([`HttpTransport`])
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use haul_core::{
    BulkSyncRequest, BulkSyncResponse, Method, PendingOperation, API_KEY_HEADER,
    OPERATION_ID_HEADER,
};
use serde_json::Value;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The call did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with an unexpected status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl TransportError {
    /// True when the server was never reached (refused, unreachable, timeout).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Connection(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// One operation addressed to its per-item endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
    /// Sent as a header so the server applies a resend only once.
    pub operation_id: String,
}

impl ItemRequest {
    /// Routes a queued operation by its kind.
    pub fn for_operation(op: &PendingOperation) -> haul_core::Result<Self> {
        let (method, path) = op.payload()?.endpoint();
        Ok(ItemRequest { method, path, body: op.data.clone(), operation_id: op.id.to_string() })
    }
}

/// Transport trait for server communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Sends one operation and returns the response status code.
    fn send(&self, request: ItemRequest) -> TransportFuture<'_, u16>;

    /// Sends a whole batch. Any status other than 200 is an error.
    fn send_bulk(&self, request: BulkSyncRequest) -> TransportFuture<'_, BulkSyncResponse>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Creates a transport whose every call is bounded by `timeout`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        api_key: Option<String>,
    ) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ItemRequest) -> TransportFuture<'_, u16> {
        Box::pin(async move {
            let response = self
                .request(http_method(request.method), &request.path)
                .header(OPERATION_ID_HEADER, &request.operation_id)
                .json(&request.body)
                .send()
                .await
                .map_err(classify)?;
            Ok(response.status().as_u16())
        })
    }

    fn send_bulk(&self, request: BulkSyncRequest) -> TransportFuture<'_, BulkSyncResponse> {
        Box::pin(async move {
            let response = self
                .request(reqwest::Method::POST, "/sync/bulk")
                .json(&request)
                .send()
                .await
                .map_err(classify)?;
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                return Err(TransportError::Status(status.as_u16()));
            }
            response.json::<BulkSyncResponse>().await.map_err(classify)
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
