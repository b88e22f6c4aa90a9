//! `application/problem+json` error responses.

use super::metrics::{categorize_endpoint, record_error};
use crate::error::{ErrorKind, ServiceError};
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub reason: String,
    pub rejected_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    pub code: String,
    pub timestamp: String,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NoData => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl Problem {
    pub fn new(
        status: StatusCode,
        code: impl Into<String>,
        detail: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Problem {
            problem_type: "about:blank".to_string(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: instance.into(),
            code: code.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            errors: vec![],
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    /// Client errors keep their message; outages get a generic detail so
    /// that internals don't leak to callers.
    pub fn from_service_error(err: &ServiceError, instance: &str) -> Self {
        let detail = match err {
            ServiceError::InferenceFailure(_) => "Emotion inference is unavailable".to_string(),
            ServiceError::IndexFailure(_) => "Similarity search is unavailable".to_string(),
            ServiceError::StorageFailure(_) => "Database connection is unavailable".to_string(),
            other => other.to_string(),
        };
        Problem::new(status_for(err.kind()), err.code(), detail, instance)
    }

    pub fn from_json_rejection(rejection: &JsonRejection, instance: &str) -> Self {
        let reason = rejection.body_text();
        Problem::new(
            StatusCode::BAD_REQUEST,
            VALIDATION_ERROR,
            "Validation failed",
            instance,
        )
        .with_errors(vec![FieldError {
            field: "body".to_string(),
            reason,
            rejected_value: None,
        }])
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

/// Logs `err`, records it and renders it as a problem response.
pub fn service_error_response(err: &ServiceError, instance: &str) -> Response {
    match err.kind() {
        ErrorKind::Unavailable => error!("{} failed: {}", instance, err),
        ErrorKind::InvalidInput | ErrorKind::NoData => warn!("{} rejected: {}", instance, err),
    }
    record_error(err.code(), categorize_endpoint(instance));
    Problem::from_service_error(err, instance).into_response()
}

pub fn json_rejection_response(rejection: &JsonRejection, instance: &str) -> Response {
    warn!("{} invalid body: {}", instance, rejection.body_text());
    record_error(VALIDATION_ERROR, categorize_endpoint(instance));
    Problem::from_json_rejection(rejection, instance).into_response()
}
