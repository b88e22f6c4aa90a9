mod file_config;

pub use file_config::{FileConfig, InferenceConfig, RecommendationConfig};

use crate::emotion::{DEFAULT_MAX_TOKENS, DEFAULT_SENTENCE_TERMINATORS};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL_DIR: &str = "models/0717_kobert_5_emotion_model";
pub const DEFAULT_DB_PATH: &str = "moviemood.db";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub model_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub worker_threads: Option<usize>,
    pub serialize_inference: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub model_dir: PathBuf,
    pub db_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,

    // Feature configs (with defaults)
    pub inference: InferenceSettings,
    pub recommendation: RecommendationSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let model_dir = file
            .model_dir
            .map(PathBuf::from)
            .or_else(|| cli.model_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
        if !model_dir.exists() {
            bail!("Model directory does not exist: {:?}", model_dir);
        }
        if !model_dir.is_dir() {
            bail!("model_dir is not a directory: {:?}", model_dir);
        }

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let inference_file = file.inference.unwrap_or_default();
        let inference = InferenceSettings {
            max_tokens: inference_file.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            worker_threads: inference_file
                .worker_threads
                .or(cli.worker_threads)
                .unwrap_or_else(default_worker_threads),
            serialize_inference: inference_file
                .serialize_inference
                .unwrap_or(cli.serialize_inference),
            sentence_terminators: inference_file
                .sentence_terminators
                .map(|s| s.chars().collect())
                .unwrap_or_else(|| DEFAULT_SENTENCE_TERMINATORS.to_vec()),
        };
        if inference.max_tokens == 0 {
            bail!("inference.max_tokens must be greater than zero");
        }
        if inference.worker_threads == 0 {
            bail!("inference.worker_threads must be greater than zero");
        }
        if inference.sentence_terminators.is_empty() {
            bail!("inference.sentence_terminators must not be empty");
        }

        let recommendation_file = file.recommendation.unwrap_or_default();
        let recommendation = RecommendationSettings {
            corpus_cache_ttl: Duration::from_secs(
                recommendation_file.corpus_cache_ttl_secs.unwrap_or(0),
            ),
        };

        Ok(Self {
            model_dir,
            db_path,
            port,
            metrics_port,
            logging_level,
            inference,
            recommendation,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub max_tokens: usize,
    /// Upper bound on concurrently running CPU-bound jobs.
    pub worker_threads: usize,
    /// Run every inference behind one global lock.
    pub serialize_inference: bool,
    pub sentence_terminators: Vec<char>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            worker_threads: default_worker_threads(),
            serialize_inference: false,
            sentence_terminators: DEFAULT_SENTENCE_TERMINATORS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationSettings {
    /// Zero means every request reads a fresh corpus snapshot.
    pub corpus_cache_ttl: Duration,
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
