//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
///
/// Everything here is fatal: per-document failures are counted in the
/// processing report and never surface as a `CliError`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid field vocabulary
    #[error("Field configuration error: {0}")]
    Schema(#[from] grantex_domain::SchemaError),

    /// Provider construction error
    #[error(transparent)]
    Llm(#[from] grantex_llm::LlmError),

    /// Validator construction error
    #[error(transparent)]
    Validation(#[from] grantex_validator::ValidationError),

    /// Pipeline setup or single-document error
    #[error(transparent)]
    Pipeline(#[from] grantex_pipeline::PipelineError),

    /// Database open or schema error
    #[error("Database error: {0}")]
    Store(#[from] grantex_store::StoreError),

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
