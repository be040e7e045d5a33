//! Single-document extraction.

use crate::cli::ExtractArgs;
use crate::commands::build_orchestrator;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use grantex_domain::{DocumentUnit, LlmProvider};
use grantex_pipeline::render_artifact;

/// Execute the extract command, returning the record as pretty JSON.
///
/// Nothing is written to the output directory or the database.
pub async fn execute_extract<L>(
    args: &ExtractArgs,
    provider: L,
    config: &AppConfig,
) -> Result<String>
where
    L: LlmProvider + 'static,
{
    if !args.file.is_file() {
        return Err(CliError::InvalidInput(format!(
            "{} is not a file",
            args.file.display()
        )));
    }

    let orchestrator = build_orchestrator(provider, config)?;
    let document = DocumentUnit::from_path(&args.file);
    let record = orchestrator.build_record(&document).await?;
    Ok(render_artifact(&record)?)
}
