//! Validator error types

use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A configured pattern failed to compile
    #[error("Invalid {name} pattern: {source}")]
    InvalidPattern {
        /// Pattern key in configuration
        name: &'static str,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// The record was rejected by the configured policy
    #[error("Record rejected: non-text values in {}", fields.join(", "))]
    Rejected {
        /// Fields that carried non-text values
        fields: Vec<String>,
    },
}
