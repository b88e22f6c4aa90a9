use super::classifier::EmotionClassifier;
use super::distribution::EmotionDistribution;
use super::labels::EMOTION_DIMENSIONS;
use super::segmenter::TextSegmenter;
use crate::error::{ServiceError, INVALID_AGGREGATION};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Selects which text units are classified and how their outputs combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum AggregationMode {
    /// The whole text as a single unit.
    Full,
    /// Mean over every sentence.
    SplitAvg,
    /// Mean over the whole text plus every sentence.
    #[default]
    OverallAvg,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::Full => "full",
            AggregationMode::SplitAvg => "split_avg",
            AggregationMode::OverallAvg => "overall_avg",
        }
    }

    /// Text units fed to the classifier for `text`, in batch order.
    pub fn units(&self, text: &str, segmenter: &TextSegmenter) -> Vec<String> {
        match self {
            AggregationMode::Full => vec![text.to_string()],
            AggregationMode::SplitAvg => segmenter.split(text),
            AggregationMode::OverallAvg => {
                let mut units = vec![text.to_string()];
                units.extend(segmenter.split(text));
                units
            }
        }
    }

    /// Classifies the units selected by this mode in one batch and combines
    /// them into a single raw distribution.
    pub fn aggregate(
        &self,
        text: &str,
        segmenter: &TextSegmenter,
        classifier: &dyn EmotionClassifier,
    ) -> Result<EmotionDistribution, ServiceError> {
        let units = self.units(text, segmenter);
        let distributions = classifier.classify_batch(&units)?;
        if distributions.len() != units.len() {
            return Err(ServiceError::InferenceFailure(format!(
                "Classifier returned {} distributions for {} units",
                distributions.len(),
                units.len()
            )));
        }

        match self {
            AggregationMode::Full => Ok(distributions[0]),
            AggregationMode::SplitAvg | AggregationMode::OverallAvg => {
                Ok(average_distributions(&distributions))
            }
        }
    }
}

impl FromStr for AggregationMode {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(AggregationMode::Full),
            "split_avg" => Ok(AggregationMode::SplitAvg),
            "overall_avg" => Ok(AggregationMode::OverallAvg),
            other => Err(ServiceError::invalid_input(
                INVALID_AGGREGATION,
                format!(
                    "Unknown aggregation '{}', expected one of full, split_avg, overall_avg",
                    other
                ),
            )),
        }
    }
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-label arithmetic mean. An empty slice yields the zero distribution.
pub fn average_distributions(distributions: &[EmotionDistribution]) -> EmotionDistribution {
    if distributions.is_empty() {
        return EmotionDistribution::zeros();
    }

    let mut sums = [0.0; EMOTION_DIMENSIONS];
    for distribution in distributions {
        for (sum, score) in sums.iter_mut().zip(distribution.scores()) {
            *sum += score;
        }
    }

    let count = distributions.len() as f64;
    for sum in sums.iter_mut() {
        *sum /= count;
    }
    EmotionDistribution::from_scores(sums)
}
