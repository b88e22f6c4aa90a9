//! Test fixtures: a fake classifier and a temporary corpus database.

use super::constants::*;
use moviemood_server::corpus_store::{
    MovieEmotionStore, MovieEmotionSummary, SqliteMovieEmotionStore,
};
use moviemood_server::emotion::{EmotionClassifier, EmotionDistribution};
use moviemood_server::error::ServiceError;
use std::path::PathBuf;
use tempfile::TempDir;

/// Deterministic stand-in for the real model.
///
/// Joyful keywords put 80% on joy, sad keywords put 80% on sadness, texts
/// with both split the mass and anything else is uniform. Units containing
/// [`POISON_TEXT`] fail the whole batch.
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn classify_one(unit: &str) -> EmotionDistribution {
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
    fn classify_batch(&self, units: &[String]) -> Result<Vec<EmotionDistribution>, ServiceError> {
        if units.iter().any(|u| u.contains(POISON_TEXT)) {
            return Err(ServiceError::InferenceFailure(
                "model runtime rejected the batch".to_string(),
            ));
        }
        Ok(units.iter().map(|u| Self::classify_one(u)).collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

fn corpus_rows() -> Vec<MovieEmotionSummary> {
    vec![
        MovieEmotionSummary::new(MOVIE_JOYFUL_ID, [0.9, 0.05, 0.02, 0.02, 0.01]),
        MovieEmotionSummary::new(MOVIE_SAD_ID, [0.05, 0.9, 0.02, 0.02, 0.01]),
        MovieEmotionSummary::new(MOVIE_BITTERSWEET_ID, [0.45, 0.45, 0.04, 0.03, 0.03]),
        MovieEmotionSummary::new(MOVIE_SCARY_ID, [0.02, 0.08, 0.1, 0.75, 0.05]),
        MovieEmotionSummary {
            movie_id: MOVIE_PARTIAL_ID,
            joy: Some(0.3),
            sadness: None,
            anger: None,
            fear: None,
            disgust: None,
        },
    ]
}

/// Creates a temporary corpus database, optionally filled with the test movies.
///
/// The returned `TempDir` must be kept alive for as long as the database is used.
pub fn create_test_corpus(populated: bool) -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("corpus.db");

    let store = SqliteMovieEmotionStore::new(&db_path)?;
    if populated {
        for row in corpus_rows() {
            store.upsert(&row)?;
        }
    }

    Ok((temp_dir, db_path))
}
