//! Error handling for the pneumonia linkage pipeline.
//!
//! Only unrecoverable conditions surface as [`Error`]. Missing columns, parse
//! failures, empty inputs and classifier failures are recovered where they
//! occur and never reach this type.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Specialized error type for the pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration that can never produce a meaningful run
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A column required by a caller was not present in a record batch
    #[error("Column '{column}' not found in record batch")]
    ColumnNotFound { column: String },

    /// A column could not be read as the expected Arrow type
    #[error("Column '{column}' could not be read as {expected}")]
    InvalidDataType { column: String, expected: String },

    /// Error opening, reading or renaming a file
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting typed records to or from Arrow
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Wrap an IO error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for configuration errors
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl From<serde_arrow::Error> for Error {
    fn from(error: serde_arrow::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
