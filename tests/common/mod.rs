#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use odonto_backend::{build_router, config::Settings, store::MemoryDocumentStore, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Settings for tests; built directly so tests never depend on the environment.
pub fn test_settings() -> Settings {
    Settings {
        database_url: "postgresql://unused".to_string(),
        store_backend: "memory".to_string(),
        database_max_connections: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 5000,
        max_body_bytes: 52_428_800,
        cors_allow_origins: vec!["*".to_string()],
        log_level: "error".to_string(),
        log_format: "plain".to_string(),
    }
}

/// Create a test application over an in-memory document store
pub fn create_test_app() -> Router {
    create_test_app_with(test_settings())
}

pub fn create_test_app_with(settings: Settings) -> Router {
    let app_state = AppState::with_store(settings, Arc::new(MemoryDocumentStore::new()));
    build_router(app_state)
}

/// Helper to extract response body as bytes
pub async fn extract_body(response: axum::response::Response) -> Vec<u8> {
    use axum::body::to_bytes;
    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    body.to_vec()
}

/// Send a request and decode the JSON envelope
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = extract_body(response).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Create a case through the API and return its stored record
pub async fn create_case(app: &Router, case_id: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/cases",
        Some(serde_json::json!({"caseId": case_id, "title": format!("Case {case_id}")})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "case creation failed: {body}");
    body["data"].clone()
}

/// Create evidence through the API and return its stored record
pub async fn create_evidence(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/api/evidence", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "evidence creation failed: {body}");
    body["data"].clone()
}

/// Helper to validate datetime string format
pub fn is_valid_datetime_string(datetime_str: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(datetime_str).is_ok()
}

/// Helper to validate UUID string format
pub fn is_valid_uuid_string(uuid_str: &str) -> bool {
    uuid::Uuid::parse_str(uuid_str).is_ok()
}
