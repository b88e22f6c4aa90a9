//! End-to-end tests for the health endpoint and unknown routes

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;

// =============================================================================
// Health Tests
// =============================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_health().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "MovieMood - KoBERT Emotion API");
    assert!(body["uptime"].as_str().unwrap().starts_with("0d "));
    assert!(body["hash"].is_string());
}

#[tokio::test]
async fn test_health_works_without_corpus_data() {
    let server = TestServer::spawn_with_empty_corpus().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_health().await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Unknown Routes
// =============================================================================

#[tokio::test]
async fn test_unknown_route_returns_problem() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get("/api/v1/emotions").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "application/problem+json"
    );

    let problem: serde_json::Value = response.json().await.unwrap();
    assert_eq!(problem["type"], "about:blank");
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["code"], "NOT_FOUND");
    assert_eq!(problem["instance"], "/api/v1/emotions");
}
