pub mod config;
mod emotion_routes;
mod http_layers;
pub mod metrics;
pub mod problem;
mod recommendation_routes;
pub mod server;
pub mod state;
pub mod worker_pool;

pub use config::{ServerConfig, SERVICE_TITLE};
pub use http_layers::*;
pub use problem::{FieldError, Problem};
pub use server::{make_app, make_metrics_app, run_server};
pub use worker_pool::WorkerPool;
