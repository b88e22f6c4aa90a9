//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When fixture data changes (corpus rows, sample texts, etc.),
//! update only this file.

// ============================================================================
// Test Corpus Movie IDs
// ============================================================================

/// Movie whose summary is almost entirely joy
pub const MOVIE_JOYFUL_ID: i64 = 101;

/// Movie whose summary is almost entirely sadness
pub const MOVIE_SAD_ID: i64 = 102;

/// Movie split evenly between joy and sadness
pub const MOVIE_BITTERSWEET_ID: i64 = 103;

/// Movie dominated by fear
pub const MOVIE_SCARY_ID: i64 = 104;

/// Movie with only a joy component, every other column NULL
pub const MOVIE_PARTIAL_ID: i64 = 105;

/// Number of movies in the test corpus
pub const CORPUS_SIZE: usize = 5;

// ============================================================================
// Sample Texts
// ============================================================================

/// Two sentences, the first joyful and the second sad
pub const SAMPLE_REVIEW: &str = "정말 재미있고 즐거운 영화였다. 결말이 너무 슬펐다.";

/// Text that makes the fake classifier fail
pub const POISON_TEXT: &str = "이 문장은 추론을 망가뜨린다";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Default request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval while waiting for the server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
