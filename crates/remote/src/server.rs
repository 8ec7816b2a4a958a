// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP server: routes, API key check, and error-to-status mapping.
//!
//! | route | success |
//! |---|---|
//! | `GET /health` | 200, `{status, database}` |
//! | `POST /deliveries` | 201 |
//! | `POST /sales` | 201 |
//! | `PUT /routes/{route_id}` | 200 |
//! | `POST /sync/bulk` | 200 with per-item results |
//!
//! A per-item operation that changes nothing or carries a malformed payload
//! answers 422; an unreachable store 503; any other store failure 500.
//!
//! Creates read an optional operation id header (bulk items use their
//! `client_ref`); a create resent under the same id answers 201 again
//! without inserting twice.

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::Value;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use haul_core::protocol::{API_KEY_HEADER, MSG_NO_EFFECT, OPERATION_ID_HEADER};
use haul_core::{ApiResponse, BulkSyncRequest, HealthReport, OperationKind};

use crate::dispatch::{dispatch_to_store, DispatchError};
use crate::handlers::{handler_for, HandlerError};
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/deliveries", post(create_delivery))
        .route("/sales", post(create_sale))
        .route("/routes/{route_id}", put(update_route))
        .route("/sync/bulk", post(sync_bulk))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new().route("/health", get(health)).merge(protected).with_state(state)
}

/// Serves until ctrl-c, then closes the store.
pub async fn run(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    serve(listener, state, shutdown_signal()).await
}

/// Serves until `shutdown` resolves, then closes the store.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    info!("Listening on: {}", listener.local_addr()?);
    axum::serve(listener, router(state.clone())).with_graceful_shutdown(shutdown).await?;

    info!("Shutting down, closing store");
    state.store().close();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

fn reply(status: StatusCode, body: ApiResponse) -> Response {
    (status, Json(body)).into_response()
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.config().api_key.as_deref() {
        let provided = request.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            warn!(path = %request.uri().path(), "rejected request without valid api key");
            let body = ApiResponse::error("invalid or missing api key");
            return reply(StatusCode::UNAUTHORIZED, body);
        }
    }
    next.run(request).await
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let report = state
        .run_blocking(|store| HealthReport::new(store.is_alive(), store.status().last_ping))
        .await
        .unwrap_or_else(|e| {
            error!("Health check task failed: {}", e);
            HealthReport::new(false, None)
        });
    Json(report)
}

fn operation_key(headers: &HeaderMap) -> Option<String> {
    let key = headers.get(OPERATION_ID_HEADER)?.to_str().ok()?.trim();
    (!key.is_empty()).then(|| key.to_string())
}

async fn create_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(data): Json<Value>,
) -> Response {
    let key = operation_key(&headers);
    apply_item(state, OperationKind::CreateDelivery, data, key, StatusCode::CREATED).await
}

async fn create_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(data): Json<Value>,
) -> Response {
    let key = operation_key(&headers);
    apply_item(state, OperationKind::CreateSale, data, key, StatusCode::CREATED).await
}

/// The path id wins over any `route_id` in the body.
async fn update_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(mut data): Json<Value>,
) -> Response {
    if let Some(fields) = data.as_object_mut() {
        fields.insert("route_id".to_string(), Value::String(route_id));
    }
    apply_item(state, OperationKind::UpdateRoute, data, None, StatusCode::OK).await
}

fn applied_message(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::CreateDelivery => "delivery recorded",
        OperationKind::CreateSale => "sale recorded",
        OperationKind::UpdateRoute => "route updated",
    }
}

async fn apply_item(
    state: AppState,
    kind: OperationKind,
    data: Value,
    key: Option<String>,
    success: StatusCode,
) -> Response {
    let outcome = state
        .run_blocking(move |store| handler_for(kind)(store, &data, key.as_deref()))
        .await;

    match outcome {
        Ok(Ok(true)) => reply(success, ApiResponse::ok(applied_message(kind))),
        Ok(Ok(false)) => {
            reply(StatusCode::UNPROCESSABLE_ENTITY, ApiResponse::error(MSG_NO_EFFECT))
        }
        Ok(Err(e @ HandlerError::InvalidPayload(_))) => {
            reply(StatusCode::UNPROCESSABLE_ENTITY, ApiResponse::error(e.to_string()))
        }
        Ok(Err(e)) if e.is_unavailable() => {
            warn!(operation = %kind, error = %e, "store unavailable");
            reply(StatusCode::SERVICE_UNAVAILABLE, ApiResponse::error(e.to_string()))
        }
        Ok(Err(e)) => {
            warn!(operation = %kind, error = %e, "operation failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::error(e.to_string()))
        }
        Err(e) => {
            error!("Handler task failed: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::error("internal error"))
        }
    }
}

async fn sync_bulk(
    State(state): State<AppState>,
    Json(request): Json<BulkSyncRequest>,
) -> Response {
    let max = state.config().max_bulk_items;
    let outcome = state.run_blocking(move |store| dispatch_to_store(store, &request, max)).await;

    match outcome {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(e @ DispatchError::BatchTooLarge { .. })) => {
            reply(StatusCode::BAD_REQUEST, ApiResponse::error(e.to_string()))
        }
        Err(e) => {
            error!("Bulk sync task failed: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::error("internal error"))
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
