use std::cmp::Reverse;

use crate::{
    dataset::Table,
    error::{AppError, AppResult},
    models::BookRecord,
};

/// Lowercased titles, aligned with the table's book ids
///
/// Resolves free-text titles to a single seed book and serves the ranked
/// interactive search.
#[derive(Debug, Clone)]
pub struct TitleIndex {
    lowered: Vec<String>,
}

impl TitleIndex {
    pub fn build(table: &Table) -> Self {
        Self {
            lowered: table.iter().map(|b| b.title.to_lowercase()).collect(),
        }
    }

    /// Resolves `query` to one book
    ///
    /// A case-insensitive exact title match wins; otherwise the substring
    /// match with the most ratings. Equal candidates go to the lowest id.
    pub fn resolve<'a>(&self, table: &'a Table, query: &str) -> AppResult<&'a BookRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::BookNotFound(query.to_string()));
        }

        let exact = self.best_match(table, |title| title == needle);
        let found = exact.or_else(|| self.best_match(table, |title| title.contains(&needle)));

        match found {
            Some(book) => {
                tracing::debug!(
                    query = %query,
                    id = book.id,
                    title = %book.title,
                    "Resolved seed title"
                );
                Ok(book)
            }
            None => Err(AppError::BookNotFound(query.to_string())),
        }
    }

    /// Books whose title contains `query`, best first
    ///
    /// Ranked by match position (earlier is better), then ratings count
    /// descending, then id ascending; truncated to `limit`.
    pub fn search<'a>(&self, table: &'a Table, query: &str, limit: usize) -> Vec<&'a BookRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<(usize, &BookRecord)> = self
            .lowered
            .iter()
            .enumerate()
            .filter_map(|(id, title)| {
                let position = title.find(&needle)?;
                table.get(id).map(|book| (position, book))
            })
            .collect();

        matches.sort_by_key(|(position, book)| (*position, Reverse(book.num_ratings), book.id));
        matches.truncate(limit);

        matches.into_iter().map(|(_, book)| book).collect()
    }

    fn best_match<'a, F>(&self, table: &'a Table, predicate: F) -> Option<&'a BookRecord>
    where
        F: Fn(&str) -> bool,
    {
        self.lowered
            .iter()
            .enumerate()
            .filter(|(_, title)| predicate(title.as_str()))
            .filter_map(|(id, _)| table.get(id))
            .max_by_key(|book| (book.num_ratings, Reverse(book.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, num_ratings: u32) -> BookRecord {
        BookRecord {
            id: 0,
            title: title.to_string(),
            author: "Someone".to_string(),
            rating: 4.0,
            num_ratings,
            genres: vec![],
            pages: 200,
        }
    }

    fn sample() -> (Table, TitleIndex) {
        let table = Table::new(vec![
            book("Harry Potter and the Chamber of Secrets", 3_000),
            book("Harry Potter and the Half-Blood Prince", 2_500),
            book("Animal Farm", 3_500),
            book("1984", 4_000),
            book("Nineteen Eighty-Four: 1984 Annotated", 50),
            book("The Potter's Hand", 9_000),
        ]);
        let index = TitleIndex::build(&table);
        (table, index)
    }

    #[test]
    fn test_resolve_exact_match_is_case_insensitive() {
        let (table, index) = sample();

        let book = index.resolve(&table, "  harry potter and the half-blood PRINCE ").unwrap();
        assert_eq!(book.id, 1);
    }

    #[test]
    fn test_resolve_exact_beats_more_popular_substring() {
        let (table, index) = sample();

        let book = index.resolve(&table, "1984").unwrap();
        assert_eq!(book.id, 3);
    }

    #[test]
    fn test_resolve_substring_prefers_most_ratings() {
        let (table, index) = sample();

        let book = index.resolve(&table, "potter").unwrap();
        assert_eq!(book.title, "The Potter's Hand");

        let book = index.resolve(&table, "harry potter").unwrap();
        assert_eq!(book.id, 0);
    }

    #[test]
    fn test_resolve_not_found() {
        let (table, index) = sample();

        let err = index.resolve(&table, "Nonexistent Book XYZ").unwrap_err();
        assert!(matches!(err, AppError::BookNotFound(ref q) if q == "Nonexistent Book XYZ"));

        assert!(matches!(
            index.resolve(&table, "   "),
            Err(AppError::BookNotFound(_))
        ));
    }

    #[test]
    fn test_search_ranking() {
        let (table, index) = sample();

        let titles: Vec<&str> = index
            .search(&table, "Potter", 10)
            .into_iter()
            .map(|b| b.title.as_str())
            .collect();

        assert_eq!(
            titles,
            vec![
                "The Potter's Hand",
                "Harry Potter and the Chamber of Secrets",
                "Harry Potter and the Half-Blood Prince",
            ]
        );
    }

    #[test]
    fn test_search_limit_and_empty_query() {
        let (table, index) = sample();

        assert_eq!(index.search(&table, "1984", 1).len(), 1);
        assert_eq!(index.search(&table, "1984", 1)[0].id, 3);
        assert!(index.search(&table, "", 5).is_empty());
        assert!(index.search(&table, "potter", 0).is_empty());
        assert!(index.search(&table, "zzz", 5).is_empty());
    }
}
