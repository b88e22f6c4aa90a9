//! Movie recommendation routes

use crate::error::{ServiceError, INVALID_RECOMMENDATION_REQUEST};
use crate::recommend::{DEFAULT_RECOMMENDATION_LIMIT, MAX_RECOMMENDATION_LIMIT};

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::time::Instant;

use super::metrics::record_recommendation;
use super::problem::{json_rejection_response, service_error_response};
use super::state::ServerState;

pub const MOVIE_RECOMMENDATIONS_PATH: &str = "/movie-recommendations";

/// A user's emotion profile. Components are non-negative and need not sum
/// to anything in particular.
#[derive(Deserialize, Debug)]
struct RecommendationBody {
    pub joy: f32,
    pub sadness: f32,
    pub anger: f32,
    pub fear: f32,
    pub disgust: f32,

    /// Number of movies to return, 1 to 50 (default: 10)
    pub limit: Option<i64>,
}

impl RecommendationBody {
    fn profile(&self) -> [f32; 5] {
        [self.joy, self.sadness, self.anger, self.fear, self.disgust]
    }

    fn limit(&self) -> Result<usize, ServiceError> {
        match self.limit {
            None => Ok(DEFAULT_RECOMMENDATION_LIMIT),
            Some(limit) => usize::try_from(limit).map_err(|_| {
                ServiceError::invalid_input(
                    INVALID_RECOMMENDATION_REQUEST,
                    format!(
                        "limit must be between 1 and {}, got {}",
                        MAX_RECOMMENDATION_LIMIT, limit
                    ),
                )
            }),
        }
    }
}

async fn recommend_movies(
    State(state): State<ServerState>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<RecommendationBody>, JsonRejection>,
) -> Response {
    let instance = uri.path();
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection_response(&rejection, instance),
    };

    let limit = match body.limit() {
        Ok(limit) => limit,
        Err(err) => return service_error_response(&err, instance),
    };

    let engine = state.recommendation_engine.clone();
    let profile = body.profile();
    let start = Instant::now();
    let result = state
        .worker_pool
        .run(move || engine.recommend(&profile, limit))
        .await
        .unwrap_or_else(|e| Err(ServiceError::IndexFailure(format!("{:#}", e))));

    match result {
        Ok(recommendations) => {
            record_recommendation("ok", start.elapsed());
            Json(recommendations).into_response()
        }
        Err(err) => {
            record_recommendation(err.code(), start.elapsed());
            service_error_response(&err, instance)
        }
    }
}

pub fn make_recommendation_routes(state: ServerState) -> Router {
    Router::new()
        .route(MOVIE_RECOMMENDATIONS_PATH, post(recommend_movies))
        .with_state(state)
}
