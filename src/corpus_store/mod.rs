mod models;
mod schema;
mod sqlite_corpus_store;

pub use models::MovieEmotionSummary;
pub use schema::{CORPUS_SCHEMA, MOVIE_EMOTION_SUMMARY_TABLE_NAME};
pub use sqlite_corpus_store::SqliteMovieEmotionStore;

use anyhow::Result;

/// Read/write access to the precomputed per-movie emotion summaries.
pub trait MovieEmotionStore: Send + Sync {
    /// Every summary, ordered by movie id.
    fn find_all(&self) -> Result<Vec<MovieEmotionSummary>>;
    fn find(&self, movie_id: i64) -> Result<Option<MovieEmotionSummary>>;
    fn count(&self) -> Result<usize>;
    /// Inserts the summary, replacing any existing row for the same movie.
    fn upsert(&self, summary: &MovieEmotionSummary) -> Result<()>;
    /// Returns whether a row was deleted.
    fn delete(&self, movie_id: i64) -> Result<bool>;
}
