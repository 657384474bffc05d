use serde::{Deserialize, Serialize};

/// A single book as loaded from the dataset
///
/// Records are created once by the loader and never mutated afterwards.
/// `id` is the dense row position (0..n) assigned after cleaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRecord {
    pub id: usize,
    pub title: String,
    pub author: String,
    /// Average rating in [0, 5]
    pub rating: f32,
    pub num_ratings: u32,
    /// Genres in dataset order, without duplicates
    pub genres: Vec<String>,
    pub pages: u32,
}

impl BookRecord {
    /// Popularity signal rewarding both quality and evidence volume:
    /// `rating * ln(1 + num_ratings)`
    pub fn popularity_score(&self) -> f64 {
        self.rating as f64 * (self.num_ratings as f64).ln_1p()
    }

    /// Whether the book carries `genre` (case-insensitive)
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    /// Key identifying editions of the same work: normalized title and author
    pub fn edition_key(&self) -> (String, String) {
        (
            normalize_title(&self.title),
            self.author.trim().to_lowercase(),
        )
    }

    /// Rough heap + inline footprint of this record in bytes
    pub fn approximate_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.title.capacity()
            + self.author.capacity()
            + self
                .genres
                .iter()
                .map(|g| std::mem::size_of::<String>() + g.capacity())
                .sum::<usize>()
    }
}

/// Lowercases a title, strips punctuation and collapses whitespace
pub fn normalize_title(title: &str) -> String {
    let stripped: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, rating: f32, num_ratings: u32) -> BookRecord {
        BookRecord {
            id: 0,
            title: title.to_string(),
            author: author.to_string(),
            rating,
            num_ratings,
            genres: vec!["Fiction".to_string(), "Classics".to_string()],
            pages: 300,
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("  The Hobbit:  or, There and Back Again "),
            "the hobbit or there and back again"
        );
        assert_eq!(normalize_title("1984"), "1984");
        assert_eq!(normalize_title("!!!"), "");
    }

    #[test]
    fn test_popularity_score() {
        let b = book("Dune", "Frank Herbert", 4.0, 99);
        let expected = 4.0 * (100.0f64).ln();
        assert!((b.popularity_score() - expected).abs() < 1e-6);

        let unrated = book("Draft", "Nobody", 5.0, 0);
        assert_eq!(unrated.popularity_score(), 0.0);
    }

    #[test]
    fn test_edition_key_ignores_case_and_punctuation() {
        let a = book("Dune!", "Frank Herbert", 4.0, 1);
        let b = book("dune", " frank herbert ", 3.0, 2);
        assert_eq!(a.edition_key(), b.edition_key());
    }

    #[test]
    fn test_has_genre() {
        let b = book("Emma", "Jane Austen", 4.0, 10);
        assert!(b.has_genre("classics"));
        assert!(!b.has_genre("Horror"));
    }
}
