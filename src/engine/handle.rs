use std::{path::Path, sync::Arc, time::Instant};

use crate::{
    config::Config,
    dataset::{self, ColumnMapping, Table},
    error::{AppError, AppResult},
    models::{BookRecord, EngineStats, RecommendationResult, Strategy},
    services::{FeatureMatrix, PopularityRanking, Recommender, SimilarityIndex, TitleIndex},
};

use super::EngineOptions;

/// Loads `path` with the default column mapping and options and builds the engine
pub fn initialize<P: AsRef<Path>>(path: P) -> AppResult<EngineHandle> {
    EngineHandle::initialize_with(path, &ColumnMapping::default(), EngineOptions::default())
}

/// Cheaply clonable handle to a fully built engine
///
/// Everything behind the handle is immutable, so any number of threads may
/// query it concurrently without locking.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    table: Table,
    features: FeatureMatrix,
    index: SimilarityIndex,
    titles: TitleIndex,
    popularity: PopularityRanking,
    options: EngineOptions,
}

impl EngineHandle {
    /// Loads the dataset and builds every derived structure
    ///
    /// Blocking and CPU-bound. No partially built engine is ever returned.
    pub fn initialize_with<P: AsRef<Path>>(
        path: P,
        mapping: &ColumnMapping,
        options: EngineOptions,
    ) -> AppResult<Self> {
        options.validate()?;
        let table = dataset::load(path, mapping)?;
        Self::new(table, options)
    }

    /// Builds the engine from the dataset and tuning in `config`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::initialize_with(
            &config.dataset_path,
            &config.column_mapping(),
            config.engine_options(),
        )
    }

    /// Builds features, similarity index, title index and popularity ranking over `table`
    pub fn new(table: Table, options: EngineOptions) -> AppResult<Self> {
        options.validate()?;
        let start = Instant::now();

        let features = FeatureMatrix::build(&table);
        let index = SimilarityIndex::build(&features);
        let titles = TitleIndex::build(&table);
        let popularity = PopularityRanking::build(&table);

        tracing::info!(
            books = table.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendation engine ready"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                table,
                features,
                index,
                titles,
                popularity,
                options,
            }),
        })
    }

    /// Recommends up to `n` books using the strategy named `strategy`
    ///
    /// Strategy names are `content`, `popularity` and `hybrid`. The seed is
    /// ignored by `popularity` and required by the other two.
    pub fn recommend(
        &self,
        strategy: &str,
        seed: Option<&str>,
        n: i64,
    ) -> AppResult<RecommendationResult> {
        let strategy: Strategy = strategy.parse()?;
        self.recommend_with(strategy, seed, n)
    }

    pub fn recommend_with(
        &self,
        strategy: Strategy,
        seed: Option<&str>,
        n: i64,
    ) -> AppResult<RecommendationResult> {
        let n = self.checked_count(n)?;

        tracing::debug!(%strategy, seed = ?seed, n, "Recommendation requested");

        self.recommender()
            .recommend(strategy, seed, n)
            .map_err(|e| log_query_error(e, strategy, seed))
    }

    /// Most popular books, optionally limited to `genre`
    pub fn popular(&self, genre: Option<&str>, n: i64) -> AppResult<RecommendationResult> {
        let n = self.checked_count(n)?;
        Ok(self.recommender().popular(genre, n))
    }

    /// Interactive title search, best matches first
    pub fn search(&self, query: &str, limit: usize) -> Vec<BookRecord> {
        self.inner
            .titles
            .search(&self.inner.table, query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Resolves a free-text title to the book used as a seed
    pub fn resolve(&self, title: &str) -> AppResult<BookRecord> {
        self.inner
            .titles
            .resolve(&self.inner.table, title)
            .cloned()
    }

    pub fn stats(&self) -> EngineStats {
        let inner = &self.inner;
        let table = &inner.table;

        EngineStats {
            total_books: table.len(),
            average_rating: table.average_rating(),
            total_ratings: table.total_ratings(),
            unique_authors: table.unique_authors(),
            average_pages: table.average_pages(),
            approximate_memory_bytes: table.approximate_memory_bytes()
                + inner.features.approximate_memory_bytes()
                + inner.index.approximate_memory_bytes()
                + inner.popularity.approximate_memory_bytes(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.inner.table
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.inner.features
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.inner.index
    }

    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    fn recommender(&self) -> Recommender<'_> {
        let inner = &self.inner;
        Recommender::new(
            &inner.table,
            &inner.index,
            &inner.titles,
            &inner.popularity,
            &inner.options,
        )
    }

    /// Non-positive counts mean "nothing"; counts above `max_results` are rejected
    fn checked_count(&self, n: i64) -> AppResult<usize> {
        if n <= 0 {
            return Ok(0);
        }

        let max = self.inner.options.max_results;
        match usize::try_from(n) {
            Ok(n) if n <= max => Ok(n),
            _ => Err(AppError::InvalidArgument(format!(
                "n must be at most {}, got {}",
                max, n
            ))),
        }
    }
}

fn log_query_error(e: AppError, strategy: Strategy, seed: Option<&str>) -> AppError {
    match &e {
        AppError::UnknownBook(id) => {
            tracing::error!(%strategy, id, "Similarity index and table disagree")
        }
        _ => tracing::debug!(%strategy, seed = ?seed, error = %e, "Recommendation failed"),
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
book_title,author,genres,num_ratings,average_rating,num_pages
1984,George Orwell,\"['Classics', 'Dystopia', 'Fiction']\",4000000,4.19,328
Brave New World,Aldous Huxley,\"['Classics', 'Dystopia', 'Fiction']\",1700000,3.99,268
The Hobbit,J.R.R. Tolkien,\"['Fantasy', 'Classics']\",4000000,4.28,366
Gone Girl,Gillian Flynn,\"['Thriller', 'Mystery']\",3000000,4.12,432
";

    fn engine() -> EngineHandle {
        let table =
            dataset::load_from_reader(CSV.as_bytes(), &ColumnMapping::default(), "inline").unwrap();
        EngineHandle::new(table, EngineOptions::default()).unwrap()
    }

    #[test]
    fn test_recommend_by_name() {
        let engine = engine();

        let recs = engine.recommend("content", Some("1984"), 2).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].book.title, "Brave New World");
    }

    #[test]
    fn test_unknown_strategy() {
        let engine = engine();

        let err = engine.recommend("collaborative", Some("1984"), 2).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_non_positive_n_is_empty() {
        let engine = engine();

        assert!(engine.recommend("hybrid", Some("1984"), 0).unwrap().is_empty());
        assert!(engine.recommend("content", Some("1984"), -4).unwrap().is_empty());
        assert!(engine.popular(None, 0).unwrap().is_empty());
    }

    #[test]
    fn test_n_above_limit() {
        let engine = engine();

        let err = engine.recommend("popularity", None, 101).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_resolve_and_search() {
        let engine = engine();

        assert_eq!(engine.resolve("the hobbit").unwrap().id, 2);
        let found = engine.search("e", 2);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].title, "The Hobbit");
    }

    #[test]
    fn test_stats() {
        let stats = engine().stats();

        assert_eq!(stats.total_books, 4);
        assert_eq!(stats.total_ratings, 12_700_000);
        assert_eq!(stats.unique_authors, 4);
        assert!((stats.average_rating - 4.145).abs() < 1e-4);
        assert!((stats.average_pages - 348.5).abs() < 1e-9);
        assert!(stats.approximate_memory_bytes > 16 * std::mem::size_of::<f32>());
    }

    #[test]
    fn test_initialize_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let engine = initialize(file.path()).unwrap();
        assert_eq!(engine.table().len(), 4);
        assert_eq!(engine.index().len(), 4);
        assert_eq!(engine.features().rows(), 4);
    }

    #[test]
    fn test_initialize_missing_file() {
        let err = initialize("/no/such/books.csv").err().unwrap();
        assert!(matches!(err, AppError::DataLoad(_)));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let table =
            dataset::load_from_reader(CSV.as_bytes(), &ColumnMapping::default(), "inline").unwrap();
        let options = EngineOptions {
            content_weight: -1.0,
            ..EngineOptions::default()
        };

        assert!(EngineHandle::new(table, options).is_err());
    }
}
