//! Batch run: extract every document, then store the artifacts.

use crate::cli::RunArgs;
use crate::commands::build_orchestrator;
use crate::config::AppConfig;
use crate::error::Result;
use grantex_domain::{LlmProvider, RecordStore};
use grantex_pipeline::{
    close_store, discover_documents, persist_artifacts, ExtractionOrchestrator, ProcessingReport,
};
use grantex_store::SqliteStore;
use std::fmt::Display;
use tracing::info;

/// Execute the run command.
///
/// Only setup problems (configuration, output directory, database) are
/// returned as errors; failed documents are counted in the report.
pub async fn execute_run<L>(
    args: &RunArgs,
    provider: L,
    config: &AppConfig,
) -> Result<ProcessingReport>
where
    L: LlmProvider + 'static,
{
    let schema = config.schema()?;
    let orchestrator = build_orchestrator(provider, config)?;

    let store = if args.no_persist {
        info!("Database phase disabled");
        None
    } else {
        let store = SqliteStore::open(&config.database.path, &schema, &config.database.table)?;
        info!(
            "Opened {} (table {})",
            config.database.path.display(),
            config.database.table
        );
        Some(store)
    };

    run_documents(&orchestrator, store, config).await
}

/// Discover, extract and (when a store is given) persist every document.
///
/// Once discovery succeeds the report is always returned and logged, even
/// when the store fails to close.
pub async fn run_documents<L, S>(
    orchestrator: &ExtractionOrchestrator<L>,
    store: Option<S>,
    config: &AppConfig,
) -> Result<ProcessingReport>
where
    L: LlmProvider + 'static,
    S: RecordStore,
    S::Error: Display,
{
    let documents = discover_documents(
        &config.directories.input_dir,
        &config.directories.file_pattern,
    )?;
    info!(
        "Found {} documents matching '{}' in {}",
        documents.len(),
        config.directories.file_pattern,
        config.directories.input_dir.display()
    );

    let mut outcome = orchestrator.run_batch(documents).await;

    if let Some(mut store) = store {
        persist_artifacts(&mut store, &outcome.artifacts, &mut outcome.report);
        close_store(store, &mut outcome.report);
    }

    for line in outcome.report.summary().lines() {
        info!("{}", line);
    }
    Ok(outcome.report)
}
