use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use axum::{
    extract::State,
    http::Uri,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::emotion_routes::make_emotion_routes;
use super::metrics::metrics_handler;
use super::problem::{Problem, NOT_FOUND};
use super::recommendation_routes::make_recommendation_routes;
use super::{log_requests, state::*, ServerConfig};

pub const API_PREFIX: &str = "/api/v1";

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    pub service: String,
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok",
        service: state.config.service_title.clone(),
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    })
}

async fn not_found(uri: Uri) -> Response {
    Problem::new(
        axum::http::StatusCode::NOT_FOUND,
        NOT_FOUND,
        format!("No route for {}", uri.path()),
        uri.path(),
    )
    .into_response()
}

pub fn make_app(
    config: ServerConfig,
    prediction_engine: GuardedPredictionEngine,
    recommendation_engine: GuardedRecommendationEngine,
) -> Result<Router> {
    let state = ServerState::new(config, prediction_engine, recommendation_engine);

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(make_emotion_routes(state.clone()))
        .merge(make_recommendation_routes(state.clone()));

    let mut app: Router = Router::new()
        .nest(API_PREFIX, api_routes)
        .fallback(not_found);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

/// Prometheus scrape endpoint, served on its own port.
pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    prediction_engine: GuardedPredictionEngine,
    recommendation_engine: GuardedRecommendationEngine,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, prediction_engine, recommendation_engine)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });
    info!("Metrics available at port {}", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Serving on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
