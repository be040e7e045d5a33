//! Conversion error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a document
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Source document does not exist
    #[error("Source document not found: {0}")]
    NotFound(PathBuf),

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// PDF text extraction failed
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// HWP document could not be read
    #[error("HWP extraction failed: {0}")]
    Hwp(String),

    /// Document variant this converter cannot read
    #[error("Unsupported document: {0}")]
    Unsupported(String),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
