use crate::emotion::{EmotionLabel, EMOTION_DIMENSIONS};
use crate::recommend::EmotionVector;
use serde::{Deserialize, Serialize};

/// One row of the `movie_emotion_summary` table.
///
/// Components may be NULL in storage when the upstream aggregation has not
/// produced a value yet; they count as 0.0 for similarity purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieEmotionSummary {
    pub movie_id: i64,
    pub joy: Option<f64>,
    pub sadness: Option<f64>,
    pub anger: Option<f64>,
    pub fear: Option<f64>,
    pub disgust: Option<f64>,
}

impl MovieEmotionSummary {
    /// A fully populated row, components in label order.
    pub fn new(movie_id: i64, components: [f64; EMOTION_DIMENSIONS]) -> Self {
        let [joy, sadness, anger, fear, disgust] = components;
        Self {
            movie_id,
            joy: Some(joy),
            sadness: Some(sadness),
            anger: Some(anger),
            fear: Some(fear),
            disgust: Some(disgust),
        }
    }

    pub fn component(&self, label: EmotionLabel) -> Option<f64> {
        match label {
            EmotionLabel::Joy => self.joy,
            EmotionLabel::Sadness => self.sadness,
            EmotionLabel::Anger => self.anger,
            EmotionLabel::Fear => self.fear,
            EmotionLabel::Disgust => self.disgust,
        }
    }

    /// Emotion vector in label order, NULL components read as 0.0.
    pub fn to_vector(&self) -> EmotionVector {
        EmotionVector::new([
            self.joy.unwrap_or(0.0) as f32,
            self.sadness.unwrap_or(0.0) as f32,
            self.anger.unwrap_or(0.0) as f32,
            self.fear.unwrap_or(0.0) as f32,
            self.disgust.unwrap_or(0.0) as f32,
        ])
    }
}
