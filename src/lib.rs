//! MovieMood emotion analysis server library
//!
//! This library exposes the internal modules for the binaries and the
//! end-to-end tests.

pub mod config;
pub mod corpus_store;
pub mod emotion;
pub mod error;
pub mod recommend;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use corpus_store::{MovieEmotionStore, MovieEmotionSummary, SqliteMovieEmotionStore};
pub use emotion::{AggregationMode, EmotionClassifier, EmotionDistribution, EmotionPredictionEngine};
pub use error::ServiceError;
pub use recommend::RecommendationEngine;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
