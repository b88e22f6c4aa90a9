use serde::{Deserialize, Serialize};

/// Number of emotion categories produced by the classifier.
pub const EMOTION_DIMENSIONS: usize = 5;

/// The fixed emotion label set.
///
/// The declaration order is the classifier's output order and the component
/// order of every emotion vector, so it must never be changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Joy,
    Sadness,
    Anger,
    Fear,
    Disgust,
}

pub const EMOTION_LABELS: [EmotionLabel; EMOTION_DIMENSIONS] = [
    EmotionLabel::Joy,
    EmotionLabel::Sadness,
    EmotionLabel::Anger,
    EmotionLabel::Fear,
    EmotionLabel::Disgust,
];

impl EmotionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Joy => "joy",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Disgust => "disgust",
        }
    }

    /// Position of this label inside distributions and vectors.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
