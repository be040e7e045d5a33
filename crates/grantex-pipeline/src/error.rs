//! Error types for pipeline operations

use grantex_convert::SourceFormat;
use std::fmt;
use thiserror::Error;

/// Step of the per-document state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Preparing the run (output directory, discovery)
    Setup,
    /// Reading the markdown source
    Read,
    /// Canonical text normalization
    Normalize,
    /// Remote extraction
    Extract,
    /// Required-field check
    CompletenessCheck,
    /// Alternate-format conversion and extraction
    Fallback(SourceFormat),
    /// Field-by-field merge of fallback results
    Merge,
    /// Shape and type checks
    Validate,
    /// Artifact write
    Persist,
    /// Database upsert
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Setup => write!(f, "setup"),
            Stage::Read => write!(f, "read"),
            Stage::Normalize => write!(f, "normalize"),
            Stage::Extract => write!(f, "extract"),
            Stage::CompletenessCheck => write!(f, "completeness check"),
            Stage::Fallback(format) => write!(f, "{} fallback", format),
            Stage::Merge => write!(f, "merge"),
            Stage::Validate => write!(f, "validate"),
            Stage::Persist => write!(f, "persist"),
            Stage::Store => write!(f, "store"),
        }
    }
}

/// What went wrong
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record rejected by the validator
    #[error(transparent)]
    Validation(#[from] grantex_validator::ValidationError),

    /// Artifact (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error
    #[error("Storage error: {0}")]
    Store(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input discovery error
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// A worker task panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),
}

/// Errors that can occur during pipeline operations
#[derive(Error, Debug)]
#[error("{stage} failed: {kind}")]
pub struct PipelineError {
    /// Stage the failure happened in
    pub stage: Stage,
    /// Underlying failure
    pub kind: ErrorKind,
}

impl PipelineError {
    /// Create an error for `stage`
    pub fn new(stage: Stage, kind: impl Into<ErrorKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }
}
