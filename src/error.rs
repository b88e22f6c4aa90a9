//! Error taxonomy shared by the inference and recommendation cores.

use thiserror::Error;

/// Broad category of a [`ServiceError`], used by callers to decide how to
/// surface it (client error, missing data, or a transient outage).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NoData,
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{detail}")]
    InvalidInput { code: &'static str, detail: String },

    #[error("Emotion vector shape is invalid: expected {expected} dimensions, got {actual}")]
    InvalidVectorShape { expected: usize, actual: usize },

    #[error("{0}")]
    NoData(String),

    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    #[error("Vector search failed: {0}")]
    IndexFailure(String),

    #[error("Storage unavailable: {0}")]
    StorageFailure(String),
}

pub const INVALID_TEXT: &str = "INVALID_TEXT";
pub const INVALID_AGGREGATION: &str = "INVALID_AGGREGATION";
pub const INVALID_RECOMMENDATION_REQUEST: &str = "INVALID_RECOMMENDATION_REQUEST";

impl ServiceError {
    pub fn invalid_input(code: &'static str, detail: impl Into<String>) -> Self {
        ServiceError::InvalidInput {
            code,
            detail: detail.into(),
        }
    }

    /// Machine readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput { code, .. } => code,
            ServiceError::InvalidVectorShape { .. } => "INVALID_EMOTION_VECTOR",
            ServiceError::NoData(_) => "NOT_FOUND_MOVIE_EMOTION_SUMMARY",
            ServiceError::InferenceFailure(_) => "INFERENCE_FAILURE",
            ServiceError::IndexFailure(_) => "INDEX_FAILURE",
            ServiceError::StorageFailure(_) => "DATABASE_UNAVAILABLE",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput { .. } | ServiceError::InvalidVectorShape { .. } => {
                ErrorKind::InvalidInput
            }
            ServiceError::NoData(_) => ErrorKind::NoData,
            ServiceError::InferenceFailure(_)
            | ServiceError::IndexFailure(_)
            | ServiceError::StorageFailure(_) => ErrorKind::Unavailable,
        }
    }
}
