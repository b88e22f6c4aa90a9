use axum::extract::FromRef;

use crate::emotion::EmotionPredictionEngine;
use crate::recommend::RecommendationEngine;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::worker_pool::WorkerPool;
use super::ServerConfig;

pub type GuardedPredictionEngine = Arc<EmotionPredictionEngine>;
pub type GuardedRecommendationEngine = Arc<RecommendationEngine>;
pub type GuardedWorkerPool = Arc<WorkerPool>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub prediction_engine: GuardedPredictionEngine,
    pub recommendation_engine: GuardedRecommendationEngine,
    pub worker_pool: GuardedWorkerPool,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        prediction_engine: GuardedPredictionEngine,
        recommendation_engine: GuardedRecommendationEngine,
    ) -> Self {
        let worker_pool = Arc::new(WorkerPool::new(config.worker_threads));
        info!("Worker pool runs {} jobs at once", worker_pool.size());
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_string(),
            prediction_engine,
            recommendation_engine,
            worker_pool,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedPredictionEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.prediction_engine.clone()
    }
}

impl FromRef<ServerState> for GuardedRecommendationEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.recommendation_engine.clone()
    }
}

impl FromRef<ServerState> for GuardedWorkerPool {
    fn from_ref(input: &ServerState) -> Self {
        input.worker_pool.clone()
    }
}
