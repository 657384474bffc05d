use std::collections::HashSet;

use crate::models::BookRecord;

/// Immutable, densely indexed collection of books
///
/// `books[i].id == i` holds for every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    books: Vec<BookRecord>,
}

impl Table {
    /// Builds a table, reassigning ids to row positions
    pub fn new(mut books: Vec<BookRecord>) -> Self {
        for (id, book) in books.iter_mut().enumerate() {
            book.id = id;
        }
        books.shrink_to_fit();
        Self { books }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&BookRecord> {
        self.books.get(id)
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookRecord> {
        self.books.iter()
    }

    /// Mean of all ratings, 0 for an empty table
    pub fn average_rating(&self) -> f64 {
        mean(self.books.iter().map(|b| b.rating as f64), self.len())
    }

    /// Mean page count, 0 for an empty table
    pub fn average_pages(&self) -> f64 {
        mean(self.books.iter().map(|b| b.pages as f64), self.len())
    }

    pub fn total_ratings(&self) -> u64 {
        self.books.iter().map(|b| b.num_ratings as u64).sum()
    }

    /// Distinct authors, compared after trimming and lowercasing
    pub fn unique_authors(&self) -> usize {
        self.books
            .iter()
            .map(|b| b.author.trim().to_lowercase())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn approximate_memory_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .books
                .iter()
                .map(BookRecord::approximate_size)
                .sum::<usize>()
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}
