//! ONNX-backed emotion classifier.
//!
//! Loads a sequence-classification model exported to ONNX together with its
//! `tokenizer.json` from a model directory, once, at startup.

use super::classifier::EmotionClassifier;
use super::distribution::EmotionDistribution;
use super::labels::EMOTION_DIMENSIONS;
use crate::error::ServiceError;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tokenizers::{PaddingStrategy, Tokenizer, TruncationParams};
use tract_onnx::prelude::*;
use tracing::{debug, info};

pub const MODEL_FILE_NAME: &str = "model.onnx";
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";
pub const DEFAULT_MAX_TOKENS: usize = 128;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelInput {
    InputIds,
    AttentionMask,
    TokenTypeIds,
}

impl ModelInput {
    fn from_node_name(name: &str) -> Option<Self> {
        if name.contains("input_ids") {
            Some(ModelInput::InputIds)
        } else if name.contains("attention_mask") {
            Some(ModelInput::AttentionMask)
        } else if name.contains("token_type_ids") {
            Some(ModelInput::TokenTypeIds)
        } else {
            None
        }
    }
}

pub struct OnnxEmotionClassifier {
    model: OnnxPlan,
    tokenizer: Tokenizer,
    inputs: Vec<ModelInput>,
    name: String,
}

impl OnnxEmotionClassifier {
    /// Loads the model and tokenizer from `model_dir`.
    /// Every unit longer than `max_tokens` tokens is truncated at inference time.
    pub fn load(model_dir: &Path, max_tokens: usize) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE_NAME);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE_NAME);
        if !model_path.exists() {
            bail!("Emotion model not found: {:?}", model_path);
        }
        if !tokenizer_path.exists() {
            bail!("Tokenizer not found: {:?}", tokenizer_path);
        }

        info!("Loading ONNX emotion model from {:?}", model_path);
        let model = tract_onnx::onnx()
            .model_for_path(&model_path)
            .context("Failed to load ONNX model")?;

        let mut inputs = Vec::new();
        for outlet in model.input_outlets()? {
            let node_name = &model.node(outlet.node).name;
            match ModelInput::from_node_name(node_name) {
                Some(input) => inputs.push(input),
                None => bail!("Unsupported model input: {}", node_name),
            }
        }
        if !inputs.contains(&ModelInput::InputIds) {
            bail!("Model has no input_ids input");
        }

        let model = model
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to make model runnable")?;

        info!("Loading tokenizer from {:?}", tokenizer_path);
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        // Keep the pad token declared by tokenizer.json, only pad per batch.
        let mut padding = tokenizer.get_padding().cloned().unwrap_or_default();
        padding.strategy = PaddingStrategy::BatchLongest;
        tokenizer.with_padding(Some(padding));

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "onnx".to_string());

        Ok(Self {
            model,
            tokenizer,
            inputs,
            name,
        })
    }

    fn run_logits(&self, units: &[String]) -> TractResult<(usize, Vec<f32>)> {
        let str_refs: Vec<&str> = units.iter().map(|s| s.as_str()).collect();
        let encodings = self
            .tokenizer
            .encode_batch(str_refs, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut tensors = TVec::new();
        for input in &self.inputs {
            let values: Vec<i64> = encodings
                .iter()
                .flat_map(|e| {
                    let column = match input {
                        ModelInput::InputIds => e.get_ids(),
                        ModelInput::AttentionMask => e.get_attention_mask(),
                        ModelInput::TokenTypeIds => e.get_type_ids(),
                    };
                    column.iter().map(|&v| v as i64).collect::<Vec<_>>()
                })
                .collect();
            let array = tract_ndarray::Array2::from_shape_vec((batch_size, seq_len), values)?;
            tensors.push(Tensor::from(array).into());
        }

        let outputs = self.model.run(tensors)?;
        let logits = outputs[0].to_array_view::<f32>()?;
        let shape = logits.shape().to_vec();
        if shape.len() != 2 || shape[0] != batch_size {
            anyhow::bail!("Unexpected logits shape {:?}", shape);
        }
        Ok((shape[1], logits.iter().copied().collect()))
    }
}

/// Numerically stable softmax.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify_batch(&self, units: &[String]) -> Result<Vec<EmotionDistribution>, ServiceError> {
        if units.is_empty() {
            return Err(ServiceError::InferenceFailure(
                "Cannot classify an empty batch".to_string(),
            ));
        }

        let (width, logits) = self
            .run_logits(units)
            .map_err(|e| ServiceError::InferenceFailure(e.to_string()))?;
        if width != EMOTION_DIMENSIONS {
            return Err(ServiceError::InferenceFailure(format!(
                "Model produced {} labels, expected {}",
                width, EMOTION_DIMENSIONS
            )));
        }
        debug!("Classified batch of {} units", units.len());

        logits
            .chunks(width)
            .map(|row| {
                EmotionDistribution::from_probabilities(&softmax(row)).ok_or_else(|| {
                    ServiceError::InferenceFailure("Malformed probability row".to_string())
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
