use std::collections::HashSet;

use crate::{
    dataset::Table,
    engine::EngineOptions,
    error::{AppError, AppResult},
    models::{BookRecord, Recommendation, RecommendationResult, Strategy},
};

use super::{
    popularity::{min_max_normalize, PopularityRanking},
    similarity::{rank_order, SimilarityIndex},
    title_search::TitleIndex,
};

/// Smallest candidate pool the hybrid strategy re-ranks
pub const MIN_HYBRID_POOL: usize = 20;

/// Generates ranked recommendations over a built engine
///
/// Borrows every prebuilt structure; nothing here mutates shared state.
pub struct Recommender<'a> {
    table: &'a Table,
    index: &'a SimilarityIndex,
    titles: &'a TitleIndex,
    popularity: &'a PopularityRanking,
    options: &'a EngineOptions,
}

impl<'a> Recommender<'a> {
    pub fn new(
        table: &'a Table,
        index: &'a SimilarityIndex,
        titles: &'a TitleIndex,
        popularity: &'a PopularityRanking,
        options: &'a EngineOptions,
    ) -> Self {
        Self {
            table,
            index,
            titles,
            popularity,
            options,
        }
    }

    /// Dispatches to the requested strategy
    ///
    /// `n == 0` yields an empty list for every strategy. Fewer than `n`
    /// results are returned when the dataset runs out of candidates.
    pub fn recommend(
        &self,
        strategy: Strategy,
        seed: Option<&str>,
        n: usize,
    ) -> AppResult<RecommendationResult> {
        match strategy {
            Strategy::Content => self.content_based(seed, n),
            Strategy::Popularity => Ok(self.popular(None, n)),
            Strategy::Hybrid => self.hybrid(seed, n),
        }
    }

    /// Nearest neighbours of the seed, scored by cosine similarity
    pub fn content_based(&self, seed: Option<&str>, n: usize) -> AppResult<RecommendationResult> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let seed = self.resolve_seed(seed)?;

        // Over-fetch so de-duplication can still fill the list
        let fetch = if self.options.dedupe {
            n.saturating_mul(3)
        } else {
            n
        };
        let neighbours = self.index.top_k(seed.id, fetch)?;

        self.finish(seed, neighbours, n)
    }

    /// Most popular books, optionally restricted to one genre
    ///
    /// Never needs a seed. Scores are popularity divided by the dataset maximum.
    pub fn popular(&self, genre: Option<&str>, n: usize) -> RecommendationResult {
        if n == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.popularity
            .ranked()
            .iter()
            .filter_map(|&id| self.table.get(id))
            .filter(|book| genre.map_or(true, |g| book.has_genre(g)))
            .filter(|book| !self.options.dedupe || seen.insert(book.edition_key()))
            .take(n)
            .map(|book| Recommendation {
                book: book.clone(),
                score: self.popularity.normalized(book.id).unwrap_or(0.0) as f32,
            })
            .collect()
    }

    /// Content neighbours re-ranked by a weighted blend with popularity
    ///
    /// The pool is the top `max(3n, 20)` content matches; popularity is
    /// min-max normalized within that pool before blending.
    pub fn hybrid(&self, seed: Option<&str>, n: usize) -> AppResult<RecommendationResult> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let seed = self.resolve_seed(seed)?;

        let pool_size = n.saturating_mul(3).max(MIN_HYBRID_POOL);
        let pool = self.index.top_k(seed.id, pool_size)?;

        let raw_popularity = pool
            .iter()
            .map(|&(id, _)| self.popularity.score(id).ok_or(AppError::UnknownBook(id)))
            .collect::<AppResult<Vec<f64>>>()?;
        let normalized = min_max_normalize(&raw_popularity);

        let content_weight = self.options.content_weight as f64;
        let popularity_weight = self.options.popularity_weight as f64;

        let mut blended: Vec<(usize, f32)> = pool
            .iter()
            .zip(normalized)
            .map(|(&(id, similarity), popularity)| {
                let score = content_weight * similarity as f64 + popularity_weight * popularity;
                (id, score as f32)
            })
            .collect();
        blended.sort_by(rank_order);

        tracing::debug!(seed = seed.id, pool = pool.len(), "Hybrid pool scored");

        self.finish(seed, blended, n)
    }

    fn resolve_seed(&self, seed: Option<&str>) -> AppResult<&'a BookRecord> {
        match seed {
            Some(title) => self.titles.resolve(self.table, title),
            None => Err(AppError::BookNotFound("no seed title provided".to_string())),
        }
    }

    /// Maps ranked ids to records, drops repeated editions and truncates to `n`
    fn finish(
        &self,
        seed: &BookRecord,
        ranked: Vec<(usize, f32)>,
        n: usize,
    ) -> AppResult<RecommendationResult> {
        let mut seen = HashSet::from([seed.edition_key()]);

        let mut results = Vec::with_capacity(n.min(ranked.len()));
        for (id, score) in ranked {
            if results.len() >= n {
                break;
            }
            let book = self.table.get(id).ok_or(AppError::UnknownBook(id))?;
            if self.options.dedupe && !seen.insert(book.edition_key()) {
                continue;
            }
            results.push(Recommendation {
                book: book.clone(),
                score,
            });
        }

        Ok(results)
    }
}
