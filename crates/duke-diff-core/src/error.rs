//! Error types for duke-diff-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for [`WorkbookSource`](crate::WorkbookSource) operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors raised by the addressing helpers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),
}

/// Errors a document reader reports through the [`WorkbookSource`](crate::WorkbookSource) seam
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document could not be opened as a workbook container
    #[error("cannot open '{path}': {reason}")]
    Open {
        /// Path of the document, as given by the caller
        path: String,
        /// Human readable cause
        reason: String,
    },

    /// The container opened but lacks a required internal structure
    #[error("malformed workbook: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Create an open error for a path
    pub fn open<P: Into<String>, S: Into<String>>(path: P, reason: S) -> Self {
        SourceError::Open {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-structure error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        SourceError::Malformed(msg.into())
    }
}
