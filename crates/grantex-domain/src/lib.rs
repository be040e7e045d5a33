//! Grantex Domain Layer
//!
//! This crate contains the record model and trait seams shared by every other
//! Grantex crate. It has no external dependencies.
//!
//! ## Key Concepts
//!
//! - **ExtractionRecord**: ordered field-name → value mapping produced by the
//!   extraction engine and reconciled across source formats
//! - **FieldSchema**: the configured field vocabulary (required + optional),
//!   with per-field prompt hints and normalization rules
//! - **DocumentUnit**: one input document on disk
//! - **Traits**: `LlmProvider` (remote model) and `RecordStore` (upsert-by-key
//!   persistence), implemented by infrastructure crates
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure data and merge logic only
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod record;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use document::DocumentUnit;
pub use record::{ExtractionRecord, FieldValue};
pub use schema::{
    FieldSchema, FieldSpec, NormalizationRule, SchemaError, FILE_PATH_FIELD,
    ORIGINAL_FILE_NAME_FIELD,
};
pub use traits::{LlmProvider, RecordStore, UpsertOutcome};
