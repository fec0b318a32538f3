//! Comparison error types

use duke_diff_core::SourceError;
use thiserror::Error;

/// Result type for comparison runs
pub type ComparisonOutcome<T> = std::result::Result<T, ComparisonError>;

/// Why a comparison produced no result.
///
/// Every variant aborts the whole run; there is no partial result.
#[derive(Debug, Error)]
pub enum ComparisonError {
    /// A document is missing, unreadable, or not a workbook container
    #[error("cannot open document '{path}': {reason}")]
    DocumentOpen { path: String, reason: String },

    /// A workbook lacks a required internal structure
    #[error("malformed workbook structure: {0}")]
    MalformedStructure(String),

    /// The caller's cancel token was observed set
    #[error("comparison cancelled")]
    Cancelled,
}

impl ComparisonError {
    /// Cancellation is a user action rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ComparisonError::Cancelled)
    }
}

impl From<SourceError> for ComparisonError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Open { path, reason } => ComparisonError::DocumentOpen { path, reason },
            SourceError::Malformed(msg) => ComparisonError::MalformedStructure(msg),
        }
    }
}
