//! Process-wide recommendation engine: built once, read by any number of callers

mod handle;
mod state;

pub use handle::{initialize, EngineHandle};
pub use state::SharedEngine;

use crate::error::{AppError, AppResult};

/// Query-time tuning fixed at engine construction
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Weight of the similarity score in the hybrid blend
    pub content_weight: f32,
    /// Weight of the pool-normalized popularity in the hybrid blend
    pub popularity_weight: f32,
    /// Drop repeated title/author pairs (and the seed's own editions)
    pub dedupe: bool,
    /// Largest `n` a single request may ask for
    pub max_results: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            content_weight: 0.7,
            popularity_weight: 0.3,
            dedupe: true,
            max_results: 100,
        }
    }
}

impl EngineOptions {
    /// Rejects weights that are negative, non-finite or both zero
    pub fn validate(&self) -> AppResult<()> {
        let weights = [self.content_weight, self.popularity_weight];

        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::InvalidArgument(format!(
                "Hybrid weights must be finite and non-negative (content {}, popularity {})",
                self.content_weight, self.popularity_weight
            )));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(AppError::InvalidArgument(
                "At least one hybrid weight must be positive".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(AppError::InvalidArgument(
                "max_results must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
