//! Grantex Pipeline
//!
//! Batch orchestration for announcement extraction.
//!
//! # Overview
//!
//! Each markdown document moves through a fixed sequence of stages:
//!
//! | Stage | What happens | On failure |
//! |-------|--------------|------------|
//! | **Read** | UTF-8 text is read from disk | document fails |
//! | **Normalize** | comments stripped, whitespace canonicalized | never fails |
//! | **Extract** | remote model call with retry and backoff | degraded empty record |
//! | **CompletenessCheck** | required fields checked | - |
//! | **Fallback** | PDF then HWP siblings converted and extracted | logged, skipped |
//! | **Merge** | blank fields filled from fallback records | - |
//! | **Validate** | shape checks, phone normalization, policy | document fails if rejected |
//! | **Persist** | `<stem>.json` written atomically | document fails |
//!
//! Storing artifacts in the database is a separate, sequential phase
//! (`persist_artifacts`) run by the driver after the batch.
//!
//! # Usage
//!
//! ```no_run
//! use grantex_domain::FieldSchema;
//! use grantex_extractor::{EngineConfig, ExtractionEngine};
//! use grantex_llm::MockProvider;
//! use grantex_pipeline::{
//!     close_store, discover_documents, persist_artifacts, ExtractionOrchestrator, PipelineConfig,
//! };
//! use grantex_store::SqliteStore;
//! use grantex_validator::RecordValidator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = FieldSchema::from_names(&["title_name", "notice_date"], &["area_name"])?;
//! let engine =
//!     ExtractionEngine::new(MockProvider::default(), schema.clone(), EngineConfig::default());
//! let validator = RecordValidator::with_defaults(schema.clone())?;
//! let config = PipelineConfig::default();
//!
//! let orchestrator = ExtractionOrchestrator::new(engine, validator, config.clone())?;
//! let documents = discover_documents(&config.input_dir, &config.file_pattern)?;
//! let mut outcome = orchestrator.run_batch(documents).await;
//!
//! let mut store = SqliteStore::open("grantex.db", &schema, "tb_bizup")?;
//! persist_artifacts(&mut store, &outcome.artifacts, &mut outcome.report);
//! close_store(store, &mut outcome.report);
//!
//! println!("{}", outcome.report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Presets
//!
//! ```
//! use grantex_pipeline::PipelineConfig;
//!
//! // Default: 4 workers, PDF then HWP fallback
//! let config = PipelineConfig::default();
//!
//! // Sequential: documents processed in input order
//! let config = PipelineConfig::sequential();
//! ```

#![warn(missing_docs)]

mod artifact;
mod config;
mod discovery;
mod error;
mod orchestrator;
mod report;

pub use artifact::{
    artifact_path, close_store, load_artifact, persist_artifacts, render_artifact,
    write_artifact, ArtifactRef,
};
pub use config::PipelineConfig;
pub use discovery::discover_documents;
pub use error::{ErrorKind, PipelineError, Stage};
pub use orchestrator::{BatchOutcome, DocumentOutcome, ExtractionOrchestrator};
pub use report::ProcessingReport;
