use csv::StringRecord;

use crate::error::DataLoadError;

/// Header aliases for each logical column, tried in order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub title: Vec<String>,
    pub author: Vec<String>,
    pub rating: Vec<String>,
    pub ratings_count: Vec<String>,
    pub genres: Vec<String>,
    pub pages: Vec<String>,
    /// Separators for genre cells that are not bracketed lists
    pub genre_delimiters: Vec<char>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        fn names(aliases: &[&str]) -> Vec<String> {
            aliases.iter().map(|a| a.to_string()).collect()
        }

        Self {
            title: names(&["book_title", "title"]),
            author: names(&["author"]),
            rating: names(&["average_rating", "rating"]),
            ratings_count: names(&["num_ratings", "ratings_count"]),
            genres: names(&["genres"]),
            pages: names(&["num_pages", "pages"]),
            genre_delimiters: vec!['|', ','],
        }
    }
}

/// Positions of the logical columns within a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub title: usize,
    pub author: usize,
    pub rating: usize,
    pub ratings_count: usize,
    pub genres: usize,
    pub pages: usize,
}

impl ColumnMapping {
    /// Locates every required column in `headers`
    ///
    /// Header comparison ignores case, surrounding whitespace and a leading
    /// byte-order mark.
    pub fn resolve(&self, headers: &StringRecord) -> Result<ColumnIndices, DataLoadError> {
        let available: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let find = |field: &'static str, aliases: &[String]| {
            aliases
                .iter()
                .find_map(|alias| {
                    available
                        .iter()
                        .position(|h| h.eq_ignore_ascii_case(alias.trim()))
                })
                .ok_or_else(|| DataLoadError::MissingColumn {
                    field,
                    available: available.clone(),
                })
        };

        Ok(ColumnIndices {
            title: find("title", &self.title)?,
            author: find("author", &self.author)?,
            rating: find("rating", &self.rating)?,
            ratings_count: find("ratings_count", &self.ratings_count)?,
            genres: find("genres", &self.genres)?,
            pages: find("pages", &self.pages)?,
        })
    }
}

/// Average rating, `None` when blank, unparseable or outside [0, 5]
pub fn parse_rating(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
}

/// Ratings count; anything unusable counts as zero ratings
pub fn parse_count(raw: &str) -> u32 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v.round().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Page count from a plain number or a bracketed list whose first element is the count
pub fn parse_pages(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();

    let first = if let Some(inner) = strip_brackets(trimmed) {
        inner.split(',').next().map(strip_quotes)?
    } else {
        trimmed
    };

    match first.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v.round().min(u32::MAX as f64) as u32),
        _ => None,
    }
}

/// Genres from a bracketed list literal (`['Fantasy', 'Fiction']`) or a
/// delimiter-separated string, de-duplicated in first-seen order
pub fn parse_genres(raw: &str, delimiters: &[char]) -> Vec<String> {
    let trimmed = raw.trim();

    let parts: Vec<&str> = match strip_brackets(trimmed) {
        Some(inner) => inner.split(',').collect(),
        None => trimmed.split(|c| delimiters.contains(&c)).collect(),
    };

    let mut genres: Vec<String> = Vec::new();
    for part in parts {
        let genre = strip_quotes(part);
        if genre.is_empty() || genres.iter().any(|g| g == genre) {
            continue;
        }
        genres.push(genre.to_string());
    }

    genres
}

fn strip_brackets(s: &str) -> Option<&str> {
    s.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_first_alias() {
        let headers = StringRecord::from(vec![
            "\u{feff}book_id",
            "Title",
            "book_title",
            "author",
            "rating",
            "ratings_count",
            "genres",
            "pages",
        ]);

        let indices = ColumnMapping::default().resolve(&headers).unwrap();

        assert_eq!(indices.title, 2);
        assert_eq!(indices.author, 3);
        assert_eq!(indices.rating, 4);
        assert_eq!(indices.ratings_count, 5);
        assert_eq!(indices.genres, 6);
        assert_eq!(indices.pages, 7);
    }

    #[test]
    fn test_resolve_missing_column() {
        let headers = StringRecord::from(vec!["title", "author", "rating", "genres", "pages"]);

        let err = ColumnMapping::default().resolve(&headers).unwrap_err();

        match err {
            DataLoadError::MissingColumn { field, available } => {
                assert_eq!(field, "ratings_count");
                assert_eq!(available.len(), 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(" 4.25 "), Some(4.25));
        assert_eq!(parse_rating("0"), Some(0.0));
        assert_eq!(parse_rating("5.5"), None);
        assert_eq!(parse_rating("-1"), None);
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,234,567"), 1_234_567);
        assert_eq!(parse_count("42.0"), 42);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("many"), 0);
    }

    #[test]
    fn test_parse_pages() {
        assert_eq!(parse_pages("352"), Some(352));
        assert_eq!(parse_pages("['352']"), Some(352));
        assert_eq!(parse_pages("[352, 'Hardcover']"), Some(352));
        assert_eq!(parse_pages("[None]"), None);
        assert_eq!(parse_pages("[]"), None);
        assert_eq!(parse_pages("unknown"), None);
    }

    #[test]
    fn test_parse_genres_list_literal() {
        let genres = parse_genres("['Fantasy', \"Fiction\", 'Fantasy', '']", &['|']);
        assert_eq!(genres, vec!["Fantasy", "Fiction"]);
    }

    #[test]
    fn test_parse_genres_delimited() {
        assert_eq!(
            parse_genres("Classics|Dystopia, Fiction", &['|', ',']),
            vec!["Classics", "Dystopia", "Fiction"]
        );
        assert!(parse_genres("   ", &['|']).is_empty());
    }
}
