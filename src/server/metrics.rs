use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all MovieMood metrics
const PREFIX: &str = "moviemood";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Inference Metrics
    pub static ref INFERENCE_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_inference_duration_seconds"),
            "Emotion prediction duration in seconds, by aggregation mode"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["aggregation"]
    ).expect("Failed to create inference_duration_seconds metric");

    // Recommendation Metrics
    pub static ref RECOMMENDATION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_recommendation_duration_seconds"),
            "Movie recommendation duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["status"]
    ).expect("Failed to create recommendation_duration_seconds metric");

    pub static ref CORPUS_MOVIES_TOTAL: IntGauge = IntGauge::new(
        format!("{PREFIX}_corpus_movies_total"),
        "Movies in the most recent corpus snapshot"
    ).expect("Failed to create corpus_movies_total metric");

    // Worker pool
    pub static ref WORKER_POOL_BUSY: Gauge = Gauge::new(
        format!("{PREFIX}_worker_pool_busy"),
        "CPU-bound jobs currently running"
    ).expect("Failed to create worker_pool_busy metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by code and endpoint"),
        &["code", "endpoint"]
    ).expect("Failed to create errors_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(INFERENCE_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CORPUS_MOVIES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(WORKER_POOL_BUSY.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Groups request paths into a bounded set of label values.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/api/v1/health" => "health",
        "/api/v1/emotion-predictions" => "emotion_predictions",
        "/api/v1/movie-recommendations" => "movie_recommendations",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let endpoint = categorize_endpoint(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

pub fn record_inference(aggregation: &str, duration: Duration) {
    INFERENCE_DURATION_SECONDS
        .with_label_values(&[aggregation])
        .observe(duration.as_secs_f64());
}

pub fn record_recommendation(status: &str, duration: Duration) {
    RECOMMENDATION_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}

pub fn set_corpus_size(count: usize) {
    CORPUS_MOVIES_TOTAL.set(count as i64);
}

/// Record an error
pub fn record_error(code: &str, endpoint: &str) {
    ERRORS_TOTAL.with_label_values(&[code, endpoint]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
