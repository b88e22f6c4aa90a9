//! Emotion-profile based movie recommendation.

mod engine;
mod vector;
mod vector_index;

pub use engine::{
    RecommendationEngine, RecommendationResult, RecommendedMovie, DEFAULT_RECOMMENDATION_LIMIT,
    MAX_RECOMMENDATION_LIMIT,
};
pub use vector::{l2_normalize, EmotionVector};
pub use vector_index::{Neighbor, VectorIndex, EMPTY_CORPUS_MESSAGE};
