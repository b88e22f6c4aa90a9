//! SQLite schema for the movie emotion corpus.
//!
//! The table layout is shared with the backend that writes the summaries,
//! so columns must keep these names.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

pub const MOVIE_EMOTION_SUMMARY_TABLE_NAME: &str = "movie_emotion_summary";

// =============================================================================
// Version 1 - Movie emotion summaries
// =============================================================================

const MOVIE_EMOTION_SUMMARY_TABLE_V1: Table = Table {
    name: MOVIE_EMOTION_SUMMARY_TABLE_NAME,
    columns: &[
        sqlite_column!("movie_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("joy", &SqlType::Real),
        sqlite_column!("sadness", &SqlType::Real),
        sqlite_column!("anger", &SqlType::Real),
        sqlite_column!("fear", &SqlType::Real),
        sqlite_column!("disgust", &SqlType::Real),
    ],
};

pub const CORPUS_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[MOVIE_EMOTION_SUMMARY_TABLE_V1],
};
