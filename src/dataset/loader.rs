use std::{fs::File, io::Read, path::Path, time::Instant};

use csv::{ReaderBuilder, StringRecord};

use super::columns::{parse_count, parse_genres, parse_pages, parse_rating, ColumnIndices};
use super::{ColumnMapping, Table};
use crate::error::DataLoadError;
use crate::models::BookRecord;

/// A row that survived cleaning but may still lack a rating or page count
struct RawBook {
    title: String,
    author: String,
    rating: Option<f32>,
    num_ratings: u32,
    genres: Vec<String>,
    pages: Option<u32>,
}

/// Loads and cleans the dataset at `path`
///
/// The file is read once and never modified. Rows without a title or author
/// are dropped; a missing rating becomes the dataset mean, missing pages the
/// dataset median and missing genres an empty set.
pub fn load<P: AsRef<Path>>(path: P, mapping: &ColumnMapping) -> Result<Table, DataLoadError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    load_from_reader(file, mapping, &path.display().to_string())
}

/// Loads and cleans CSV data from any reader; `source` names it in logs and errors
pub fn load_from_reader<R: Read>(
    reader: R,
    mapping: &ColumnMapping,
    source: &str,
) -> Result<Table, DataLoadError> {
    let start = Instant::now();

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = mapping.resolve(&headers)?;

    let mut raw_books = Vec::new();
    let mut dropped = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                tracing::debug!(line = line + 2, error = %e, "Dropping unreadable row");
                dropped += 1;
                continue;
            }
        };

        match parse_row(&record, &columns, &mapping.genre_delimiters) {
            Some(raw) => raw_books.push(raw),
            None => {
                tracing::debug!(line = line + 2, "Dropping row without title or author");
                dropped += 1;
            }
        }
    }

    if raw_books.is_empty() {
        return Err(DataLoadError::Empty {
            path: source.to_string(),
        });
    }

    let mean_rating = mean_rating(&raw_books);
    let median_pages = median_pages(&raw_books);
    let ratings_imputed = raw_books.iter().filter(|b| b.rating.is_none()).count();
    let pages_imputed = raw_books.iter().filter(|b| b.pages.is_none()).count();

    let books: Vec<BookRecord> = raw_books
        .into_iter()
        .enumerate()
        .map(|(id, raw)| BookRecord {
            id,
            title: raw.title,
            author: raw.author,
            rating: raw.rating.unwrap_or(mean_rating),
            num_ratings: raw.num_ratings,
            genres: raw.genres,
            pages: raw.pages.unwrap_or(median_pages),
        })
        .collect();

    let table = Table::new(books);

    tracing::info!(
        source = %source,
        books = table.len(),
        dropped,
        ratings_imputed,
        pages_imputed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Dataset loaded"
    );

    Ok(table)
}

fn parse_row(
    record: &StringRecord,
    columns: &ColumnIndices,
    genre_delimiters: &[char],
) -> Option<RawBook> {
    let field = |idx: usize| record.get(idx).unwrap_or("");

    let title = field(columns.title).trim();
    let author = field(columns.author).trim();
    if title.is_empty() || author.is_empty() {
        return None;
    }

    Some(RawBook {
        title: title.to_string(),
        author: author.to_string(),
        rating: parse_rating(field(columns.rating)),
        num_ratings: parse_count(field(columns.ratings_count)),
        genres: parse_genres(field(columns.genres), genre_delimiters),
        pages: parse_pages(field(columns.pages)),
    })
}

fn mean_rating(books: &[RawBook]) -> f32 {
    let ratings: Vec<f64> = books.iter().filter_map(|b| b.rating).map(f64::from).collect();
    if ratings.is_empty() {
        return 0.0;
    }
    (ratings.iter().sum::<f64>() / ratings.len() as f64) as f32
}

fn median_pages(books: &[RawBook]) -> u32 {
    let mut pages: Vec<u32> = books.iter().filter_map(|b| b.pages).collect();
    if pages.is_empty() {
        return 0;
    }
    pages.sort_unstable();

    let mid = pages.len() / 2;
    if pages.len() % 2 == 0 {
        ((pages[mid - 1] as f64 + pages[mid] as f64) / 2.0).round() as u32
    } else {
        pages[mid]
    }
}
