// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::super::test_helpers::*;
use super::*;
use haul_core::{BulkSyncResponse, Method};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const TIMEOUT: Duration = Duration::from_secs(2);

/// Serves one connection with a canned response and hands back the raw
/// request it received.
async fn canned(response: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(request);
    });
    (url, rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{body}",
        body.len()
    )
}

fn item(method: Method, path: &str) -> ItemRequest {
    ItemRequest {
        method,
        path: path.to_string(),
        body: json!({"route_id": "r1"}),
        operation_id: "0000000000001-0000-d1".to_string(),
    }
}

#[test]
fn item_request_routes_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let queue = open_queue(dir.path());
    let delivery = queue.enqueue(&delivery()).unwrap();
    let route = queue.enqueue(&route_update("route-42")).unwrap();

    let request = ItemRequest::for_operation(&delivery).unwrap();
    assert_eq!((request.method, request.path.as_str()), (Method::Post, "/deliveries"));
    assert_eq!(request.body, delivery.data);
    assert_eq!(request.operation_id, delivery.id.to_string());

    let request = ItemRequest::for_operation(&route).unwrap();
    assert_eq!((request.method, request.path.as_str()), (Method::Put, "/routes/route-42"));
}

#[test]
fn connectivity_errors_are_classified() {
    assert!(TransportError::Timeout.is_connectivity());
    assert!(TransportError::Connection("refused".into()).is_connectivity());
    assert!(!TransportError::Status(500).is_connectivity());
    assert!(!TransportError::Decode("bad".into()).is_connectivity());
}

#[test]
fn base_url_drops_trailing_slash() {
    let transport = HttpTransport::new("http://host:7890/", TIMEOUT, None).unwrap();
    assert_eq!(transport.base_url(), "http://host:7890");
}

#[tokio::test]
async fn send_returns_status_and_sends_method_path_key_and_op_id() {
    let (url, request) = canned(http_response("201 Created", "{}")).await;
    let transport = HttpTransport::new(&url, TIMEOUT, Some("s3cret".into())).unwrap();

    let status = transport.send(item(Method::Put, "/routes/r1")).await.unwrap();

    assert_eq!(status, 201);
    let raw = request.await.unwrap();
    assert!(raw.starts_with("PUT /routes/r1 HTTP/1.1"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("x-api-key: s3cret"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("x-operation-id: 0000000000001-0000-d1"), "{raw}");
    assert!(raw.contains(r#""route_id":"r1""#), "{raw}");
}

#[tokio::test]
async fn send_reports_error_statuses_without_failing() {
    let (url, _request) = canned(http_response("500 Internal Server Error", "{}")).await;
    let transport = HttpTransport::new(&url, TIMEOUT, None).unwrap();

    let status = transport.send(item(Method::Post, "/sales")).await.unwrap();

    assert_eq!(status, 500);
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let transport = HttpTransport::new(&url, TIMEOUT, None).unwrap();

    let err = transport.send(item(Method::Post, "/sales")).await.unwrap_err();

    assert!(err.is_connectivity(), "{err:?}");
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let _hold = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });
    let transport = HttpTransport::new(&url, Duration::from_millis(200), None).unwrap();

    let err = transport.send(item(Method::Post, "/sales")).await.unwrap_err();

    assert!(matches!(err, TransportError::Timeout), "{err:?}");
}

#[tokio::test]
async fn send_bulk_decodes_response() {
    let body = BulkSyncResponse::from_results(vec![]).to_json().unwrap();
    let (url, request) = canned(http_response("200 OK", &body)).await;
    let transport = HttpTransport::new(&url, TIMEOUT, None).unwrap();

    let response = transport
        .send_bulk(haul_core::BulkSyncRequest::from_pending(&[], Some("d1".into())))
        .await
        .unwrap();

    assert_eq!(response.total, 0);
    let raw = request.await.unwrap();
    assert!(raw.starts_with("POST /sync/bulk HTTP/1.1"), "{raw}");
    assert!(raw.contains(r#""device_id":"d1""#), "{raw}");
}

#[tokio::test]
async fn send_bulk_rejects_non_200() {
    let (url, _request) = canned(http_response("400 Bad Request", r#"{"success":false}"#)).await;
    let transport = HttpTransport::new(&url, TIMEOUT, None).unwrap();

    let err = transport
        .send_bulk(haul_core::BulkSyncRequest::from_pending(&[], None))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Status(400)), "{err:?}");
}

#[tokio::test]
async fn send_bulk_rejects_garbage_body() {
    let (url, _request) = canned(http_response("200 OK", "not json")).await;
    let transport = HttpTransport::new(&url, TIMEOUT, None).unwrap();

    let err = transport
        .send_bulk(haul_core::BulkSyncRequest::from_pending(&[], None))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)), "{err:?}");
}
