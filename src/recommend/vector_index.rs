//! Exact inner-product index over L2-normalized emotion vectors.
//!
//! Every corpus row is normalized once at build time, so a query against a
//! normalized vector scores rows by cosine similarity. Search is brute force:
//! a single matrix-vector product followed by a stable sort.

use super::vector::{l2_normalize, EmotionVector};
use crate::emotion::EMOTION_DIMENSIONS;
use crate::error::ServiceError;
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Corpora at least this large are normalized on the rayon pool.
const PARALLEL_BUILD_THRESHOLD: usize = 4096;

pub const EMPTY_CORPUS_MESSAGE: &str = "No movie emotion summary data found";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: i64,
    pub score: f32,
}

pub struct VectorIndex {
    ids: Vec<i64>,
    matrix: Array2<f32>,
}

impl VectorIndex {
    /// Builds the index from `(id, vector)` rows, keeping their order for
    /// tie-breaking. An empty corpus is reported as [`ServiceError::NoData`].
    pub fn build(rows: &[(i64, EmotionVector)]) -> Result<Self, ServiceError> {
        if rows.is_empty() {
            return Err(ServiceError::NoData(EMPTY_CORPUS_MESSAGE.to_string()));
        }

        let normalized: Vec<EmotionVector> = if rows.len() >= PARALLEL_BUILD_THRESHOLD {
            rows.par_iter().map(|(_, v)| v.normalized()).collect()
        } else {
            rows.iter().map(|(_, v)| v.normalized()).collect()
        };

        let flat: Vec<f32> = normalized
            .iter()
            .flat_map(|v| v.components().iter().copied())
            .collect();
        let matrix = Array2::from_shape_vec((rows.len(), EMOTION_DIMENSIONS), flat)
            .map_err(|e| ServiceError::IndexFailure(format!("Failed to build index: {}", e)))?;

        Ok(Self {
            ids: rows.iter().map(|(id, _)| *id).collect(),
            matrix,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.matrix.ncols()
    }

    /// Returns up to `k` rows most similar to `query`, best first.
    ///
    /// The query is normalized here, `k` is clamped to the corpus size and
    /// equal scores keep corpus order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, ServiceError> {
        if query.len() != self.dimensions() {
            return Err(ServiceError::InvalidVectorShape {
                expected: self.dimensions(),
                actual: query.len(),
            });
        }

        let mut query = query.to_vec();
        l2_normalize(&mut query);
        let scores = self.matrix.dot(&ArrayView1::from(&query[..]));

        if let Some(position) = scores.iter().position(|s| !s.is_finite()) {
            return Err(ServiceError::IndexFailure(format!(
                "Non-finite similarity for movie {}",
                self.ids[position]
            )));
        }

        let mut order: Vec<usize> = (0..self.ids.len()).collect();
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        Ok(order
            .into_iter()
            .take(k.min(self.ids.len()))
            .map(|row| Neighbor {
                id: self.ids[row],
                score: scores[row],
            })
            .collect())
    }
}
