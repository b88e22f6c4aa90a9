use super::aggregation::AggregationMode;
use super::classifier::SharedClassifier;
use super::distribution::EmotionDistribution;
use super::segmenter::TextSegmenter;
use crate::error::{ServiceError, INVALID_TEXT};
use serde::Serialize;
use tracing::debug;

/// Result of a single prediction.
#[derive(Debug, Clone, Serialize)]
pub struct EmotionPrediction {
    /// The input text, stripped.
    pub text: String,
    pub aggregation: AggregationMode,
    /// Percentages with two decimals.
    pub probabilities: EmotionDistribution,
}

/// Turns free text into a percentage distribution over the emotion labels.
pub struct EmotionPredictionEngine {
    classifier: SharedClassifier,
    segmenter: TextSegmenter,
}

impl EmotionPredictionEngine {
    pub fn new(classifier: SharedClassifier, segmenter: TextSegmenter) -> Self {
        Self {
            classifier,
            segmenter,
        }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Raw (unformatted) aggregated distribution for `text`.
    pub fn predict_raw(
        &self,
        text: &str,
        aggregation: AggregationMode,
    ) -> Result<EmotionDistribution, ServiceError> {
        let stripped = text.trim();
        if stripped.is_empty() {
            return Err(ServiceError::invalid_input(
                INVALID_TEXT,
                "text must not be blank",
            ));
        }

        debug!(
            "Predicting emotions with {} aggregation over {} chars",
            aggregation,
            stripped.chars().count()
        );
        aggregation.aggregate(stripped, &self.segmenter, self.classifier.as_ref())
    }

    pub fn predict(
        &self,
        text: &str,
        aggregation: AggregationMode,
    ) -> Result<EmotionPrediction, ServiceError> {
        let raw = self.predict_raw(text, aggregation)?;
        Ok(EmotionPrediction {
            text: text.trim().to_string(),
            aggregation,
            probabilities: raw.to_percentages(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::classifier::EmotionClassifier;
    use crate::emotion::labels::{EmotionLabel, EMOTION_LABELS};
    use std::sync::Arc;

    /// Puts most of the mass on joy or sadness depending on keywords.
    struct KeywordClassifier;

    impl KeywordClassifier {
        fn classify_one(unit: &str) -> EmotionDistribution {
            let joy = unit.contains("즐거") || unit.contains("재미");
            let sadness = unit.contains("슬펐") || unit.contains("슬픈");
            let scores = match (joy, sadness) {
                (true, true) => [0.45, 0.45, 0.04, 0.03, 0.03],
                (true, false) => [0.8, 0.05, 0.05, 0.05, 0.05],
                (false, true) => [0.05, 0.8, 0.05, 0.05, 0.05],
                (false, false) => [0.2, 0.2, 0.2, 0.2, 0.2],
            };
            EmotionDistribution::from_scores(scores)
        }
    }

    impl EmotionClassifier for KeywordClassifier {
        fn classify_batch(
            &self,
            units: &[String],
        ) -> Result<Vec<EmotionDistribution>, ServiceError> {
            Ok(units.iter().map(|u| Self::classify_one(u)).collect())
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    struct BrokenClassifier;

    impl EmotionClassifier for BrokenClassifier {
        fn classify_batch(&self, _: &[String]) -> Result<Vec<EmotionDistribution>, ServiceError> {
            Err(ServiceError::InferenceFailure("runtime exploded".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn engine() -> EmotionPredictionEngine {
        EmotionPredictionEngine::new(Arc::new(KeywordClassifier), TextSegmenter::default())
    }

    const SAMPLE: &str = "정말 재미있고 즐거운 영화였다. 결말이 너무 슬펐다.";

    #[test]
    fn blank_text_is_invalid_input() {
        for text in ["", "   ", "\n\t"] {
            let err = engine()
                .predict(text, AggregationMode::OverallAvg)
                .unwrap_err();
            assert_eq!(err.code(), "INVALID_TEXT");
        }
    }

    #[test]
    fn every_mode_reports_all_labels_summing_to_one_hundred() {
        let engine = engine();
        for mode in [
            AggregationMode::Full,
            AggregationMode::SplitAvg,
            AggregationMode::OverallAvg,
        ] {
            let prediction = engine.predict(SAMPLE, mode).unwrap();
            assert_eq!(prediction.probabilities.iter().count(), EMOTION_LABELS.len());
            let total = prediction.probabilities.total();
            assert!((total - 100.0).abs() <= 0.1, "{} sums to {}", mode, total);
        }
    }

    #[test]
    fn split_avg_sample_is_dominated_by_joy_and_sadness() {
        let prediction = engine()
            .predict(&format!("  {}  ", SAMPLE), AggregationMode::SplitAvg)
            .unwrap();
        assert_eq!(prediction.text, SAMPLE);

        let probabilities = prediction.probabilities;
        let joy = probabilities.get(EmotionLabel::Joy);
        let sadness = probabilities.get(EmotionLabel::Sadness);
        assert_eq!(joy, 42.5);
        assert_eq!(sadness, 42.5);
        for label in [EmotionLabel::Anger, EmotionLabel::Fear, EmotionLabel::Disgust] {
            assert!(probabilities.get(label) < joy / 2.0);
            assert!(probabilities.get(label) < sadness / 2.0);
        }
    }

    #[test]
    fn full_mode_equals_single_unit_classification() {
        let engine = engine();
        let prediction = engine.predict(" 즐거운 영화. ", AggregationMode::Full).unwrap();
        let direct = KeywordClassifier::classify_one("즐거운 영화.").to_percentages();
        assert_eq!(prediction.probabilities, direct);
    }

    #[test]
    fn classifier_failures_propagate() {
        let engine =
            EmotionPredictionEngine::new(Arc::new(BrokenClassifier), TextSegmenter::default());
        let err = engine.predict("text", AggregationMode::Full).unwrap_err();
        assert_eq!(err.code(), "INFERENCE_FAILURE");
        assert_eq!(engine.classifier_name(), "broken");
    }
}
