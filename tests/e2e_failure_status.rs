//! E2E tests for `api.failure_status = "legacy"`

mod common;

use common::TestServer;
use serde_json::{Value, json};
use taskboard::config::FailureStatusMode;

async fn legacy_server() -> TestServer {
    TestServer::with_config(|config| config.api.failure_status = FailureStatusMode::Legacy).await
}

#[tokio::test]
async fn test_legacy_duplicate_email_is_http_200() {
    let server = legacy_server().await;
    server.register("Ada", "ada@example.com", "hunter2").await;

    let (status, body) = server.register("Ada", "ada@example.com", "hunter2").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Email already exists. Please use a different email."
    );
}

#[tokio::test]
async fn test_legacy_invalid_credentials_is_http_200() {
    let server = legacy_server().await;
    server.register("Ada", "ada@example.com", "hunter2").await;

    let (status, body) = server.login("ada@example.com", "wrong").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid Credentials. Try Again!");
}

#[tokio::test]
async fn test_legacy_not_found_is_http_200() {
    let server = legacy_server().await;

    let response = server
        .client
        .put(server.url("/api/tasks/01ARZ3NDEKTSV4RRFFQ69G5FAV/completed"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_legacy_keeps_status_for_malformed_requests() {
    let server = legacy_server().await;

    let response = server
        .client
        .post(server.url("/api/tasks"))
        .json(&json!({ "title": "missing everything else" }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
