//! Grantex Extractor
//!
//! Turns canonical announcement text into an `ExtractionRecord` using an LLM.
//!
//! # Overview
//!
//! The extractor owns the two text-facing stages of the pipeline:
//!
//! - **DocumentNormalizer**: comment stripping and whitespace cleanup so every
//!   source format reaches the model in the same canonical shape
//! - **ExtractionEngine**: prompt construction, the remote call, response
//!   parsing, and retry with exponential backoff
//!
//! # Architecture
//!
//! ```text
//! Text → Normalizer → Engine → LLM → JSON object → ExtractionRecord
//! ```
//!
//! The engine never returns an error. When every attempt fails it yields an
//! all-empty record marked `ExtractionStatus::Degraded`, so downstream stages
//! always receive a well-shaped record but can still tell total failure apart
//! from genuinely empty fields.
//!
//! # Example Usage
//!
//! ```no_run
//! use grantex_domain::FieldSchema;
//! use grantex_extractor::{DocumentNormalizer, EngineConfig, ExtractionEngine};
//! use grantex_llm::MockProvider;
//!
//! # async fn example() {
//! let schema = FieldSchema::from_names(&["title_name"], &["area_name"]).unwrap();
//! let llm = MockProvider::new(r#"{"title_name": "Export Voucher", "area_name": "Busan"}"#);
//! let engine = ExtractionEngine::new(llm, schema, EngineConfig::default());
//!
//! let text = DocumentNormalizer::new().normalize("# Export Voucher\r\n\r\n\r\n\r\nBusan");
//! let extraction = engine.extract(&text).await;
//!
//! println!("Degraded: {}", extraction.is_degraded());
//! println!("Title: {:?}", extraction.record.text("title_name"));
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod normalizer;
mod parser;
mod prompt;
mod types;


pub use config::EngineConfig;
pub use engine::ExtractionEngine;
pub use error::ExtractorError;
pub use normalizer::DocumentNormalizer;
pub use parser::parse_llm_response;
pub use prompt::{default_hint, PromptBuilder, SYSTEM_INSTRUCTIONS};
pub use types::{Extraction, ExtractionStatus};
