//! XLSX error types

use std::path::Path;

use duke_diff_core::SourceError;
use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl XlsxError {
    /// Whether the failure means the container itself could not be opened
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            XlsxError::Io(_) | XlsxError::Zip(_) | XlsxError::InvalidFormat(_)
        )
    }

    /// Classify into the engine-facing error for a document at `path`
    pub fn into_source_error(self, path: &Path) -> SourceError {
        if self.is_open_failure() {
            SourceError::open(path.display().to_string(), self.to_string())
        } else {
            SourceError::malformed(format!("{}: {}", path.display(), self))
        }
    }
}
