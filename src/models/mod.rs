use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

mod book;

pub use book::{normalize_title, BookRecord};

/// Recommendation strategy
///
/// The set of strategies is closed; dispatch happens in
/// [`crate::services::Recommender::recommend`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Nearest neighbours of the seed in feature space
    Content,
    /// Highest `rating * ln(1 + num_ratings)`, seed ignored
    Popularity,
    /// Content neighbours re-ranked with pool-normalized popularity
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Content, Strategy::Popularity, Strategy::Hybrid];

    /// Whether the strategy needs a resolvable seed title
    pub fn requires_seed(&self) -> bool {
        !matches!(self, Strategy::Popularity)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Content => write!(f, "content"),
            Strategy::Popularity => write!(f, "popularity"),
            Strategy::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(Strategy::Content),
            "popularity" => Ok(Strategy::Popularity),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown strategy '{}': expected one of content, popularity, hybrid",
                other
            ))),
        }
    }
}

/// A recommended book with its strategy-specific score
///
/// Score is the cosine similarity for content, the dataset-normalized
/// popularity for popularity, and the weighted blend for hybrid.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub book: BookRecord,
    pub score: f32,
}

/// Ordered recommendations, best first
pub type RecommendationResult = Vec<Recommendation>;

/// Aggregate figures over the loaded dataset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineStats {
    pub total_books: usize,
    pub average_rating: f64,
    pub total_ratings: u64,
    pub unique_authors: usize,
    pub average_pages: f64,
    pub approximate_memory_bytes: usize,
}
