use super::labels::{EmotionLabel, EMOTION_DIMENSIONS, EMOTION_LABELS};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A score for every emotion label.
///
/// Scores are stored positionally in label order, so a distribution always
/// covers exactly the fixed label set, even when every score is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionDistribution {
    scores: [f64; EMOTION_DIMENSIONS],
}

impl EmotionDistribution {
    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn from_scores(scores: [f64; EMOTION_DIMENSIONS]) -> Self {
        Self { scores }
    }

    /// Builds a distribution from a classifier output row.
    /// Returns `None` when the row width doesn't match the label set.
    pub fn from_probabilities(row: &[f32]) -> Option<Self> {
        if row.len() != EMOTION_DIMENSIONS {
            return None;
        }
        let mut scores = [0.0; EMOTION_DIMENSIONS];
        for (score, probability) in scores.iter_mut().zip(row) {
            *score = *probability as f64;
        }
        Some(Self { scores })
    }

    pub fn get(&self, label: EmotionLabel) -> f64 {
        self.scores[label.index()]
    }

    pub fn scores(&self) -> &[f64; EMOTION_DIMENSIONS] {
        &self.scores
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        EMOTION_LABELS
            .iter()
            .copied()
            .zip(self.scores.iter().copied())
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Label with the highest score, first label wins on ties.
    pub fn dominant(&self) -> EmotionLabel {
        let mut best = EMOTION_LABELS[0];
        for (label, score) in self.iter() {
            if score > self.get(best) {
                best = label;
            }
        }
        best
    }

    /// Converts raw probabilities to percentages with two decimals.
    pub fn to_percentages(&self) -> Self {
        let mut scores = [0.0; EMOTION_DIMENSIONS];
        for (formatted, raw) in scores.iter_mut().zip(self.scores.iter()) {
            *formatted = round_to_two_decimals(raw * 100.0);
        }
        Self { scores }
    }
}

/// Rounds half away from zero, so 0.125 becomes 0.13.
pub fn round_to_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Serialize for EmotionDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EMOTION_DIMENSIONS))?;
        for (label, score) in self.iter() {
            map.serialize_entry(label.as_str(), &score)?;
        }
        map.end()
    }
}
