//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure. Implementations live in other crates.

use crate::record::ExtractionRecord;
use std::future::Future;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (grantex-llm). A single call is
/// one attempt; retry and backoff belong to the caller.
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Generate a completion for `prompt`, steered by a system `instructions` message
    fn generate(
        &self,
        instructions: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created with this surrogate id
    Inserted(i64),
    /// An existing row with this surrogate id was updated
    Updated(i64),
}

impl UpsertOutcome {
    /// Surrogate id of the affected row
    pub fn id(&self) -> i64 {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => *id,
        }
    }
}

/// Trait for persisting final records
///
/// Implemented by the infrastructure layer (grantex-store). Rows are keyed by
/// the `original_file_name` field.
pub trait RecordStore {
    /// Error type for store operations
    type Error;

    /// Insert the record, or update the existing row's non-blank fields
    fn upsert(&mut self, record: &ExtractionRecord) -> Result<UpsertOutcome, Self::Error>;

    /// Fetch a stored record and its surrogate id by natural key
    fn get_by_file_name(
        &self,
        original_file_name: &str,
    ) -> Result<Option<(i64, ExtractionRecord)>, Self::Error>;

    /// Number of stored rows
    fn count(&self) -> Result<usize, Self::Error>;

    /// End the session, flushing anything the backend still holds
    fn close(self) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }
}
