//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for every server endpoint.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub async fn get_health(&self) -> Response {
        self.client
            .get(self.url("/api/v1/health"))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Emotion Predictions
    // ========================================================================

    /// POST /api/v1/emotion-predictions, omitting `aggregation` when `None`
    pub async fn predict(&self, text: &str, aggregation: Option<&str>) -> Response {
        let mut body = json!({ "text": text });
        if let Some(aggregation) = aggregation {
            body["aggregation"] = json!(aggregation);
        }
        self.predict_raw(body).await
    }

    pub async fn predict_raw(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/v1/emotion-predictions"))
            .json(&body)
            .send()
            .await
            .expect("Prediction request failed")
    }

    // ========================================================================
    // Movie Recommendations
    // ========================================================================

    /// POST /api/v1/movie-recommendations with the profile in label order
    pub async fn recommend(&self, profile: [f64; 5], limit: Option<i64>) -> Response {
        let mut body = json!({
            "joy": profile[0],
            "sadness": profile[1],
            "anger": profile[2],
            "fear": profile[3],
            "disgust": profile[4],
        });
        if let Some(limit) = limit {
            body["limit"] = json!(limit);
        }
        self.recommend_raw(body).await
    }

    pub async fn recommend_raw(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/v1/movie-recommendations"))
            .json(&body)
            .send()
            .await
            .expect("Recommendation request failed")
    }

    /// POST with an arbitrary, possibly invalid, JSON payload
    pub async fn post_text(&self, path: &str, payload: &str) -> Response {
        self.client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }
}
