//! Error types for the Extractor

use thiserror::Error;

/// Errors from a single extraction attempt
///
/// These never escape `ExtractionEngine::extract`; they are logged, drive the
/// retry loop, and end up in `ExtractionStatus::Degraded` when attempts run out.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Response was not in the expected shape
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
