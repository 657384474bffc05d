use std::collections::BTreeSet;
use std::time::Instant;

use rayon::prelude::*;

use crate::dataset::Table;
use crate::models::BookRecord;

/// Column of the normalized rating
pub const RATING_FEATURE: usize = 0;
/// Column of the log-scaled ratings count
pub const RATINGS_COUNT_FEATURE: usize = 1;
/// First genre indicator column
pub const GENRE_OFFSET: usize = 2;

/// Fixed-width numeric encoding of every book, one row per book id
///
/// Row layout: `[rating / 5, ln(1 + num_ratings) / ln(1 + max_num_ratings),
/// genre indicators..., pages / max_pages]`. Every component lies in [0, 1].
/// Normalization denominators are taken from the table at build time and
/// stay fixed for the lifetime of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    vocabulary: Vec<String>,
    dims: usize,
    values: Vec<f32>,
    max_num_ratings: u32,
    max_pages: u32,
}

impl FeatureMatrix {
    /// Encodes every book of `table`
    ///
    /// The genre vocabulary is the sorted union of all genres, so the same
    /// table always produces the same matrix.
    pub fn build(table: &Table) -> Self {
        let start = Instant::now();

        let vocabulary: Vec<String> = table
            .iter()
            .flat_map(|b| b.genres.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let dims = GENRE_OFFSET + vocabulary.len() + 1;
        let max_num_ratings = table.iter().map(|b| b.num_ratings).max().unwrap_or(0);
        let max_pages = table.iter().map(|b| b.pages).max().unwrap_or(0);

        let encoder = Encoder {
            vocabulary: &vocabulary,
            log_max_ratings: (max_num_ratings as f64).ln_1p(),
            max_pages: max_pages as f64,
        };

        let mut values = vec![0.0f32; table.len() * dims];
        values
            .par_chunks_mut(dims)
            .zip(table.books().par_iter())
            .for_each(|(row, book)| encoder.encode(book, row));

        tracing::info!(
            books = table.len(),
            dims,
            genres = vocabulary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Feature matrix built"
        );

        Self {
            vocabulary,
            dims,
            values,
            max_num_ratings,
            max_pages,
        }
    }

    /// Number of rows (books)
    pub fn rows(&self) -> usize {
        self.values.len() / self.dims
    }

    /// Width of every row
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Feature vector of book `id`
    pub fn row(&self, id: usize) -> Option<&[f32]> {
        let start = id.checked_mul(self.dims)?;
        self.values.get(start..start + self.dims)
    }

    /// Sorted genre vocabulary; genre `i` lives in column `GENRE_OFFSET + i`
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Column holding the indicator for `genre`, if it is in the vocabulary
    pub fn genre_column(&self, genre: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|g| g.as_str().cmp(genre))
            .ok()
            .map(|i| GENRE_OFFSET + i)
    }

    /// Column of the normalized page count
    pub fn pages_column(&self) -> usize {
        self.dims - 1
    }

    pub fn max_num_ratings(&self) -> u32 {
        self.max_num_ratings
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn approximate_memory_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.values.capacity() * std::mem::size_of::<f32>()
            + self
                .vocabulary
                .iter()
                .map(|g| std::mem::size_of::<String>() + g.capacity())
                .sum::<usize>()
    }
}

struct Encoder<'a> {
    vocabulary: &'a [String],
    log_max_ratings: f64,
    max_pages: f64,
}

impl Encoder<'_> {
    fn encode(&self, book: &BookRecord, row: &mut [f32]) {
        row[RATING_FEATURE] = (book.rating / 5.0).clamp(0.0, 1.0);

        row[RATINGS_COUNT_FEATURE] = if self.log_max_ratings > 0.0 {
            ((book.num_ratings as f64).ln_1p() / self.log_max_ratings) as f32
        } else {
            0.0
        };

        for genre in &book.genres {
            if let Ok(i) = self.vocabulary.binary_search_by(|g| g.as_str().cmp(genre)) {
                row[GENRE_OFFSET + i] = 1.0;
            }
        }

        let last = row.len() - 1;
        row[last] = if self.max_pages > 0.0 {
            (book.pages as f64 / self.max_pages) as f32
        } else {
            0.0
        };
    }
}
