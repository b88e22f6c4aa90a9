use super::RequestsLoggingLevel;

pub const SERVICE_TITLE: &str = "MovieMood - KoBERT Emotion API";

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Maximum number of predictions/recommendations computed at once.
    pub worker_threads: usize,
    /// Reported by the health endpoint.
    pub service_title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8000,
            metrics_port: 9091,
            worker_threads: 4,
            service_title: SERVICE_TITLE.to_string(),
        }
    }
}
