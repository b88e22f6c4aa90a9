use super::models::MovieEmotionSummary;
use super::schema::CORPUS_SCHEMA;
use super::MovieEmotionStore;
use crate::sqlite_persistence::read_schema_version;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

pub struct SqliteMovieEmotionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMovieEmotionStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path).context("Failed to open corpus database")?;
        Self::prepare_schema(&conn, path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        CORPUS_SCHEMA.create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn prepare_schema(conn: &Connection, path: &Path) -> Result<()> {
        let mut table_exists = false;
        for table in CORPUS_SCHEMA.tables {
            table_exists |= table.exists(conn)?;
        }

        match read_schema_version(conn)? {
            None if !table_exists => {
                info!("Creating movie emotion summary table in {:?}", path);
                CORPUS_SCHEMA.create(conn)?;
            }
            None => {
                // Table written by another service, adopt it as-is.
                CORPUS_SCHEMA
                    .validate(conn)
                    .context("Existing movie emotion summary table is incompatible")?;
                info!("Adopting existing movie emotion summary table in {:?}", path);
                CORPUS_SCHEMA.stamp(conn)?;
            }
            Some(db_version) if db_version != CORPUS_SCHEMA.version => {
                bail!(
                    "Unsupported corpus database version {} (expected {})",
                    db_version,
                    CORPUS_SCHEMA.version
                );
            }
            Some(db_version) => {
                CORPUS_SCHEMA.validate(conn).with_context(|| {
                    format!(
                        "Corpus database schema validation failed for version {}",
                        db_version
                    )
                })?;
            }
        }
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Corpus database lock poisoned"))
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<MovieEmotionSummary> {
        Ok(MovieEmotionSummary {
            movie_id: row.get("movie_id")?,
            joy: row.get("joy")?,
            sadness: row.get("sadness")?,
            anger: row.get("anger")?,
            fear: row.get("fear")?,
            disgust: row.get("disgust")?,
        })
    }
}

impl MovieEmotionStore for SqliteMovieEmotionStore {
    fn find_all(&self) -> Result<Vec<MovieEmotionSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT movie_id, joy, sadness, anger, fear, disgust
             FROM movie_emotion_summary
             ORDER BY movie_id",
        )?;
        let rows = stmt
            .query_map([], Self::row_to_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn find(&self, movie_id: i64) -> Result<Option<MovieEmotionSummary>> {
        let conn = self.conn()?;
        let summary = conn
            .query_row(
                "SELECT movie_id, joy, sadness, anger, fear, disgust
                 FROM movie_emotion_summary
                 WHERE movie_id = ?1",
                params![movie_id],
                Self::row_to_summary,
            )
            .optional()?;
        Ok(summary)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM movie_emotion_summary", [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    fn upsert(&self, summary: &MovieEmotionSummary) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO movie_emotion_summary (movie_id, joy, sadness, anger, fear, disgust)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(movie_id) DO UPDATE SET
                joy = ?2, sadness = ?3, anger = ?4, fear = ?5, disgust = ?6",
            params![
                summary.movie_id,
                summary.joy,
                summary.sadness,
                summary.anger,
                summary.fear,
                summary.disgust
            ],
        )?;
        Ok(())
    }

    fn delete(&self, movie_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM movie_emotion_summary WHERE movie_id = ?1",
            params![movie_id],
        )?;
        Ok(deleted > 0)
    }
}
