//! Dense cosine-similarity index over the feature matrix

use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;

use super::features::FeatureMatrix;
use crate::error::{AppError, AppResult};

/// Precomputed pairwise similarity for every pair of books
///
/// Scores are in [0, 1], symmetric, and exactly 1.0 on the diagonal.
/// Storage is a dense `n * n` matrix, so memory grows quadratically with the
/// number of books.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    n: usize,
    scores: Vec<f32>,
}

impl SimilarityIndex {
    /// Computes all pairwise similarities eagerly, one row per rayon task
    pub fn build(matrix: &FeatureMatrix) -> Self {
        let start = Instant::now();
        let n = matrix.rows();
        let dims = matrix.dims();

        // Unit-length rows turn every cosine into a plain dot product
        let mut units = vec![0.0f32; n * dims];
        units
            .par_chunks_mut(dims)
            .enumerate()
            .for_each(|(id, unit)| {
                let row = matrix.row(id).unwrap_or_default();
                let magnitude = row.iter().map(|x| x * x).sum::<f32>().sqrt();
                if magnitude > 0.0 {
                    for (u, x) in unit.iter_mut().zip(row) {
                        *u = x / magnitude;
                    }
                }
            });

        let mut scores = vec![0.0f32; n * n];
        if n > 0 {
            scores.par_chunks_mut(n).enumerate().for_each(|(i, out)| {
                let a = &units[i * dims..(i + 1) * dims];
                for (j, score) in out.iter_mut().enumerate() {
                    *score = if i == j {
                        1.0
                    } else {
                        let b = &units[j * dims..(j + 1) * dims];
                        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                        dot.clamp(0.0, 1.0)
                    };
                }
            });
        }

        tracing::info!(
            books = n,
            matrix_bytes = scores.len() * std::mem::size_of::<f32>(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Similarity index built"
        );

        Self { n, scores }
    }

    /// Number of indexed books
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity between books `a` and `b`
    pub fn similarity(&self, a: usize, b: usize) -> AppResult<f32> {
        let row = self.row(a)?;
        row.get(b).copied().ok_or(AppError::UnknownBook(b))
    }

    /// The `k` books most similar to `id`, excluding `id` itself
    ///
    /// Sorted by descending score; equal scores are ordered by ascending id.
    pub fn top_k(&self, id: usize, k: usize) -> AppResult<Vec<(usize, f32)>> {
        let row = self.row(id)?;

        let mut candidates: Vec<(usize, f32)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(other, _)| *other != id)
            .collect();

        if k < candidates.len() {
            candidates.select_nth_unstable_by(k, rank_order);
            candidates.truncate(k);
        }
        candidates.sort_unstable_by(rank_order);

        Ok(candidates)
    }

    pub fn approximate_memory_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.scores.capacity() * std::mem::size_of::<f32>()
    }

    fn row(&self, id: usize) -> AppResult<&[f32]> {
        if id >= self.n {
            return Err(AppError::UnknownBook(id));
        }
        Ok(&self.scores[id * self.n..(id + 1) * self.n])
    }
}

/// Descending score, then ascending id
pub(crate) fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
