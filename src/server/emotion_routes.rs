//! Emotion prediction routes

use crate::emotion::{AggregationMode, EmotionDistribution};
use crate::error::ServiceError;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::metrics::record_inference;
use super::problem::{json_rejection_response, service_error_response};
use super::state::ServerState;

pub const EMOTION_PREDICTIONS_PATH: &str = "/emotion-predictions";

#[derive(Deserialize, Debug)]
struct EmotionPredictionBody {
    pub text: String,

    /// One of `full`, `split_avg` or `overall_avg` (default).
    pub aggregation: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EmotionPredictionResponse {
    pub text: String,
    pub aggregation: AggregationMode,
    pub probabilities: EmotionDistribution,
    pub analyzed_at: String,
}

fn analyzed_at(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn predict_emotions(
    State(state): State<ServerState>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<EmotionPredictionBody>, JsonRejection>,
) -> Response {
    let instance = uri.path();
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return json_rejection_response(&rejection, instance),
    };

    let aggregation = match body.aggregation.as_deref() {
        None => AggregationMode::default(),
        Some(value) => match value.parse::<AggregationMode>() {
            Ok(mode) => mode,
            Err(err) => return service_error_response(&err, instance),
        },
    };

    let engine = state.prediction_engine.clone();
    let text = body.text;
    let start = Instant::now();
    let result = state
        .worker_pool
        .run(move || engine.predict(&text, aggregation))
        .await
        .unwrap_or_else(|e| Err(ServiceError::InferenceFailure(format!("{:#}", e))));

    match result {
        Ok(prediction) => {
            record_inference(aggregation.as_str(), start.elapsed());
            Json(EmotionPredictionResponse {
                text: prediction.text,
                aggregation: prediction.aggregation,
                probabilities: prediction.probabilities,
                analyzed_at: analyzed_at(Utc::now()),
            })
            .into_response()
        }
        Err(err) => service_error_response(&err, instance),
    }
}

pub fn make_emotion_routes(state: ServerState) -> Router {
    Router::new()
        .route(EMOTION_PREDICTIONS_PATH, post(predict_emotions))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn analyzed_at_is_utc_iso_with_z_suffix() {
        let now = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
        assert_eq!(analyzed_at(now), "2024-05-17T08:30:00.000Z");
    }

    #[test]
    fn body_aggregation_is_optional() {
        let body: EmotionPredictionBody = serde_json::from_str(r#"{"text": "좋다"}"#).unwrap();
        assert_eq!(body.text, "좋다");
        assert!(body.aggregation.is_none());
    }
}
