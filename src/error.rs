use std::path::PathBuf;

/// Errors raised while reading and cleaning the dataset
#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    #[error("Failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{field}' not found (available: {available:?})")]
    MissingColumn {
        field: &'static str,
        available: Vec<String>,
    },

    #[error("Dataset {path} contains no usable rows")]
    Empty { path: String },
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Unknown book id: {0}")]
    UnknownBook(usize),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller can retry with different input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::BookNotFound(_) | AppError::InvalidArgument(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(AppError::BookNotFound("Dune".to_string()).is_recoverable());
        assert!(AppError::InvalidArgument("n".to_string()).is_recoverable());
        assert!(!AppError::UnknownBook(7).is_recoverable());
        assert!(!AppError::Internal("join".to_string()).is_recoverable());
    }

    #[test]
    fn test_missing_column_message() {
        let err: AppError = DataLoadError::MissingColumn {
            field: "title",
            available: vec!["author".to_string()],
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Data load error: Required column 'title' not found (available: [\"author\"])"
        );
    }
}
