//! Input document discovery

use crate::error::{ErrorKind, PipelineError, Stage};
use glob::Pattern;
use grantex_domain::DocumentUnit;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Find documents under `input_dir` whose file name matches `pattern`
///
/// The walk is recursive; results are sorted by path. A missing input
/// directory is an error, an empty one is not.
pub fn discover_documents(
    input_dir: &Path,
    pattern: &str,
) -> Result<Vec<DocumentUnit>, PipelineError> {
    let pattern = Pattern::new(pattern).map_err(|e| {
        PipelineError::new(
            Stage::Setup,
            ErrorKind::Discovery(format!("invalid pattern '{}': {}", pattern, e)),
        )
    })?;

    if !input_dir.is_dir() {
        return Err(PipelineError::new(
            Stage::Setup,
            ErrorKind::Discovery(format!(
                "input directory {} does not exist",
                input_dir.display()
            )),
        ));
    }

    let mut paths: Vec<_> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| pattern.matches(name))
        })
        .map(|entry| entry.into_path())
        .collect();

    paths.sort();
    debug!("Discovered {} documents under {}", paths.len(), input_dir.display());

    Ok(paths.into_iter().map(DocumentUnit::from_path).collect())
}
