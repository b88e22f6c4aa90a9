//! Emotion inference: segmentation, batched classification and aggregation.

mod aggregation;
mod classifier;
mod distribution;
mod engine;
mod labels;
mod onnx_classifier;
mod segmenter;

pub use aggregation::{average_distributions, AggregationMode};
pub use classifier::{EmotionClassifier, SerializedClassifier, SharedClassifier};
pub use distribution::{round_to_two_decimals, EmotionDistribution};
pub use engine::{EmotionPrediction, EmotionPredictionEngine};
pub use labels::{EmotionLabel, EMOTION_DIMENSIONS, EMOTION_LABELS};
pub use onnx_classifier::{
    OnnxEmotionClassifier, DEFAULT_MAX_TOKENS, MODEL_FILE_NAME, TOKENIZER_FILE_NAME,
};
pub use segmenter::{TextSegmenter, DEFAULT_SENTENCE_TERMINATORS};
