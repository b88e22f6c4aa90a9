use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub model_dir: Option<String>,
    pub db_path: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    // Feature configs
    pub inference: Option<InferenceConfig>,
    pub recommendation: Option<RecommendationConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct InferenceConfig {
    pub max_tokens: Option<usize>,
    pub worker_threads: Option<usize>,
    pub serialize_inference: Option<bool>,
    /// Characters that end a sentence, e.g. ".!?"
    pub sentence_terminators: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RecommendationConfig {
    pub corpus_cache_ttl_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
