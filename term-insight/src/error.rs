//! Error types for term-insight.
//!
//! The engine prefers graceful degradation for data-shape problems: empty
//! columns, mismatched lengths and undersized samples produce zero-valued or
//! empty results. `InsightError` is reserved for structural problems that the
//! caller (usually an external loader) has to handle.

use thiserror::Error;

/// The main error type for term-insight.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A row does not have one cell per column.
    #[error("Row {row} of dataset '{dataset}' has {found} cells, expected {expected}")]
    RowLength {
        /// Name of the dataset being constructed
        dataset: String,
        /// Zero-based row index
        row: usize,
        /// Number of columns declared by the dataset
        expected: usize,
        /// Number of cells found in the row
        found: usize,
    },

    /// A required column is not present in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A chunk handler failed while processing a large dataset.
    #[error("Chunk {chunk} failed: {message}")]
    ChunkProcessing {
        /// Zero-based chunk index
        chunk: usize,
        /// Detailed error message
        message: String,
    },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, InsightError>`.
///
/// # Examples
///
/// ```rust
/// use term_insight::error::Result;
///
/// fn load() -> Result<usize> {
///     Ok(42)
/// }
/// # assert_eq!(load().unwrap(), 42);
/// ```
pub type Result<T> = std::result::Result<T, InsightError>;

impl InsightError {
    /// Creates a new invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new chunk processing error.
    pub fn chunk_processing(chunk: usize, message: impl Into<String>) -> Self {
        Self::ChunkProcessing {
            chunk,
            message: message.into(),
        }
    }

    /// Creates a new column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<InsightError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            InsightError::Internal(inner) => InsightError::Internal(format!("{msg}: {inner}")),
            other => InsightError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                InsightError::Internal(inner) => {
                    InsightError::Internal(format!("{msg}: {inner}"))
                }
                other => InsightError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
