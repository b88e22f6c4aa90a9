use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moviemood_server::config;
use moviemood_server::corpus_store::{MovieEmotionStore, SqliteMovieEmotionStore};
use moviemood_server::emotion::{
    EmotionPredictionEngine, OnnxEmotionClassifier, SerializedClassifier, SharedClassifier,
    TextSegmenter,
};
use moviemood_server::recommend::RecommendationEngine;
use moviemood_server::server::{
    metrics, run_server, RequestsLoggingLevel, ServerConfig, SERVICE_TITLE,
};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the exported classifier (model.onnx, tokenizer.json).
    #[clap(long, value_parser = parse_path)]
    pub model_dir: Option<PathBuf>,

    /// Path to the SQLite database with the movie emotion summaries.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Maximum number of predictions or recommendations computed at once.
    /// Defaults to the available parallelism.
    #[clap(long)]
    pub worker_threads: Option<usize>,

    /// Run at most one inference at a time, process wide.
    #[clap(long)]
    pub serialize_inference: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            model_dir: args.model_dir.clone(),
            db_path: args.db_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            worker_threads: args.worker_threads,
            serialize_inference: args.serialize_inference,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  model_dir: {:?}", app_config.model_dir);
    info!("  db_path: {:?}", app_config.db_path);
    info!("  port: {}", app_config.port);
    info!("  worker_threads: {}", app_config.inference.worker_threads);
    info!(
        "  serialize_inference: {}",
        app_config.inference.serialize_inference
    );

    info!("Initializing metrics...");
    metrics::init_metrics();

    info!("Loading emotion classifier from {:?}", app_config.model_dir);
    let onnx_classifier =
        OnnxEmotionClassifier::load(&app_config.model_dir, app_config.inference.max_tokens)?;
    let classifier: SharedClassifier = if app_config.inference.serialize_inference {
        Arc::new(SerializedClassifier::new(Arc::new(onnx_classifier)))
    } else {
        Arc::new(onnx_classifier)
    };
    let segmenter = TextSegmenter::new(app_config.inference.sentence_terminators.clone());
    let prediction_engine = Arc::new(EmotionPredictionEngine::new(classifier, segmenter));
    info!(
        "Emotion classifier {} ready",
        prediction_engine.classifier_name()
    );

    if !app_config.db_path.exists() {
        info!("Creating new corpus database at {:?}", app_config.db_path);
    }
    let store = Arc::new(SqliteMovieEmotionStore::new(&app_config.db_path)?);
    let corpus_size = store.count()?;
    metrics::set_corpus_size(corpus_size);
    info!("Corpus holds {} movie emotion summaries", corpus_size);

    let recommendation_engine = Arc::new(RecommendationEngine::with_cache_ttl(
        store,
        app_config.recommendation.corpus_cache_ttl,
    ));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        worker_threads: app_config.inference.worker_threads,
        service_title: SERVICE_TITLE.to_string(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    tokio::select! {
        result = run_server(server_config, prediction_engine, recommendation_engine) => {
            if let Err(err) = &result {
                error!("Server stopped: {:#}", err);
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
