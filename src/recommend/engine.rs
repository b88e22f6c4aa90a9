use super::vector::EmotionVector;
use super::vector_index::VectorIndex;
use crate::corpus_store::MovieEmotionStore;
use crate::emotion::EMOTION_DIMENSIONS;
use crate::error::{ServiceError, INVALID_RECOMMENDATION_REQUEST};
use crate::server::metrics;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedMovie {
    pub movie_id: i64,
    pub similarity: f32,
}

/// Ranked recommendations, best first. `count` always equals `items.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub count: usize,
    pub items: Vec<RecommendedMovie>,
}

struct CachedIndex {
    built_at: Instant,
    index: Arc<VectorIndex>,
}

/// Finds the movies whose emotion summary is closest to a user profile.
pub struct RecommendationEngine {
    store: Arc<dyn MovieEmotionStore>,
    cache_ttl: Duration,
    cached: Mutex<Option<CachedIndex>>,
}

impl RecommendationEngine {
    /// Reads a fresh corpus snapshot on every request.
    pub fn new(store: Arc<dyn MovieEmotionStore>) -> Self {
        Self::with_cache_ttl(store, Duration::ZERO)
    }

    /// Reuses a built index for up to `cache_ttl`. A zero TTL disables caching.
    pub fn with_cache_ttl(store: Arc<dyn MovieEmotionStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache_ttl,
            cached: Mutex::new(None),
        }
    }

    pub fn recommend(
        &self,
        profile: &[f32],
        limit: usize,
    ) -> Result<RecommendationResult, ServiceError> {
        let query = validate_request(profile, limit)?;
        let index = self.snapshot()?;

        if limit > index.len() {
            debug!(
                "Clamping recommendation limit {} to corpus size {}",
                limit,
                index.len()
            );
        }

        let items: Vec<RecommendedMovie> = index
            .search(query.components(), limit)?
            .into_iter()
            .map(|neighbor| RecommendedMovie {
                movie_id: neighbor.id,
                similarity: neighbor.score,
            })
            .collect();

        Ok(RecommendationResult {
            count: items.len(),
            items,
        })
    }

    fn snapshot(&self) -> Result<Arc<VectorIndex>, ServiceError> {
        if self.cache_ttl.is_zero() {
            return self.build_index().map(Arc::new);
        }

        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cached.as_ref() {
            if entry.built_at.elapsed() < self.cache_ttl {
                return Ok(entry.index.clone());
            }
        }

        let index = Arc::new(self.build_index()?);
        *cached = Some(CachedIndex {
            built_at: Instant::now(),
            index: index.clone(),
        });
        Ok(index)
    }

    fn build_index(&self) -> Result<VectorIndex, ServiceError> {
        let rows: Vec<(i64, EmotionVector)> = self
            .store
            .find_all()
            .map_err(|e| ServiceError::StorageFailure(format!("{:#}", e)))?
            .iter()
            .map(|summary| (summary.movie_id, summary.to_vector()))
            .collect();
        debug!("Building vector index over {} movies", rows.len());
        metrics::set_corpus_size(rows.len());
        VectorIndex::build(&rows)
    }
}

fn validate_request(profile: &[f32], limit: usize) -> Result<EmotionVector, ServiceError> {
    if profile.len() != EMOTION_DIMENSIONS {
        return Err(ServiceError::InvalidVectorShape {
            expected: EMOTION_DIMENSIONS,
            actual: profile.len(),
        });
    }
    if !(1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) {
        return Err(ServiceError::invalid_input(
            INVALID_RECOMMENDATION_REQUEST,
            format!(
                "limit must be between 1 and {}, got {}",
                MAX_RECOMMENDATION_LIMIT, limit
            ),
        ));
    }
    if profile.iter().any(|c| !c.is_finite() || *c < 0.0) {
        return Err(ServiceError::invalid_input(
            INVALID_RECOMMENDATION_REQUEST,
            "emotion profile components must be finite and non-negative",
        ));
    }
    EmotionVector::from_slice(profile)
}
