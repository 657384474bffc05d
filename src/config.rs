use serde::Deserialize;

use crate::dataset::ColumnMapping;
use crate::engine::EngineOptions;

/// Application configuration loaded from environment variables
///
/// Every variable is read with the `SHELFMATCH_` prefix, e.g.
/// `SHELFMATCH_DATASET_PATH`. List-valued fields take comma-separated values.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Location of the books CSV
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Header aliases for the title column
    #[serde(default = "default_title_columns")]
    pub title_columns: Vec<String>,

    /// Header aliases for the author column
    #[serde(default = "default_author_columns")]
    pub author_columns: Vec<String>,

    /// Header aliases for the average rating column
    #[serde(default = "default_rating_columns")]
    pub rating_columns: Vec<String>,

    /// Header aliases for the ratings count column
    #[serde(default = "default_ratings_count_columns")]
    pub ratings_count_columns: Vec<String>,

    /// Header aliases for the genres column
    #[serde(default = "default_genres_columns")]
    pub genres_columns: Vec<String>,

    /// Header aliases for the page count column
    #[serde(default = "default_pages_columns")]
    pub pages_columns: Vec<String>,

    /// Characters separating genres in a plain (non-list) genre cell
    #[serde(default = "default_genre_delimiters")]
    pub genre_delimiters: String,

    /// Weight of the similarity score in the hybrid blend
    #[serde(default = "default_content_weight")]
    pub content_weight: f32,

    /// Weight of the normalized popularity in the hybrid blend
    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f32,

    /// Drop repeated title/author pairs from recommendation lists
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,

    /// Largest `n` accepted per recommendation request
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Seed titles used by the demonstration binary
    #[serde(default = "default_demo_titles")]
    pub demo_titles: Vec<String>,
}

fn default_dataset_path() -> String {
    "goodreads_books_2024.csv".to_string()
}

fn default_title_columns() -> Vec<String> {
    vec!["book_title".to_string(), "title".to_string()]
}

fn default_author_columns() -> Vec<String> {
    vec!["author".to_string()]
}

fn default_rating_columns() -> Vec<String> {
    vec!["average_rating".to_string(), "rating".to_string()]
}

fn default_ratings_count_columns() -> Vec<String> {
    vec!["num_ratings".to_string(), "ratings_count".to_string()]
}

fn default_genres_columns() -> Vec<String> {
    vec!["genres".to_string()]
}

fn default_pages_columns() -> Vec<String> {
    vec!["num_pages".to_string(), "pages".to_string()]
}

fn default_genre_delimiters() -> String {
    "|,".to_string()
}

fn default_content_weight() -> f32 {
    0.7
}

fn default_popularity_weight() -> f32 {
    0.3
}

fn default_dedupe() -> bool {
    true
}

fn default_max_results() -> usize {
    100
}

fn default_demo_titles() -> Vec<String> {
    vec![
        "1984".to_string(),
        "The Hobbit".to_string(),
        "Harry Potter".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            title_columns: default_title_columns(),
            author_columns: default_author_columns(),
            rating_columns: default_rating_columns(),
            ratings_count_columns: default_ratings_count_columns(),
            genres_columns: default_genres_columns(),
            pages_columns: default_pages_columns(),
            genre_delimiters: default_genre_delimiters(),
            content_weight: default_content_weight(),
            popularity_weight: default_popularity_weight(),
            dedupe: default_dedupe(),
            max_results: default_max_results(),
            demo_titles: default_demo_titles(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("SHELFMATCH_")
            .from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Header aliases and genre delimiters handed to the dataset loader
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            title: self.title_columns.clone(),
            author: self.author_columns.clone(),
            rating: self.rating_columns.clone(),
            ratings_count: self.ratings_count_columns.clone(),
            genres: self.genres_columns.clone(),
            pages: self.pages_columns.clone(),
            genre_delimiters: self.genre_delimiters.chars().collect(),
        }
    }

    /// Query-time tuning handed to the engine
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            content_weight: self.content_weight,
            popularity_weight: self.popularity_weight,
            dedupe: self.dedupe,
            max_results: self.max_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_column_mapping() {
        let config = Config::default();
        let mapping = config.column_mapping();

        assert_eq!(mapping, ColumnMapping::default());
        assert_eq!(config.engine_options(), EngineOptions::default());
    }

    #[test]
    fn test_deserialize_from_pairs() {
        let vars = vec![
            ("DATASET_PATH".to_string(), "books.csv".to_string()),
            ("TITLE_COLUMNS".to_string(), "name,title".to_string()),
            ("CONTENT_WEIGHT".to_string(), "0.5".to_string()),
            ("DEDUPE".to_string(), "false".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.dataset_path, "books.csv");
        assert_eq!(config.title_columns, vec!["name", "title"]);
        assert_eq!(config.content_weight, 0.5);
        assert!(!config.dedupe);
        assert_eq!(config.popularity_weight, 0.3);
        assert_eq!(config.max_results, 100);
    }
}
