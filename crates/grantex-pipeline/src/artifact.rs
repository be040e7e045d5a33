//! JSON artifacts and the database phase
//!
//! Every processed document leaves a `<stem>.json` file behind. Artifacts are
//! the hand-off between extraction (parallel, no database) and persistence
//! (sequential, one transaction per document).

use crate::error::{ErrorKind, PipelineError, Stage};
use crate::report::ProcessingReport;
use grantex_domain::{ExtractionRecord, FieldValue, RecordStore, UpsertOutcome};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info};

/// A written artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// File name of the source document (the persistence key)
    pub file_name: String,
    /// Path of the JSON artifact
    pub path: PathBuf,
}

/// Serializes a record as a JSON object in field order
struct OrderedRecord<'a>(&'a ExtractionRecord);

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.fields() {
            match value {
                FieldValue::Text(text) => map.serialize_entry(name, text)?,
                FieldValue::NonText { raw, .. } => map.serialize_entry(name, raw)?,
            }
        }
        map.end()
    }
}

/// Render a record as pretty-printed JSON, keys in record order
pub fn render_artifact(record: &ExtractionRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&OrderedRecord(record))
}

/// Path of the artifact for a document stem
pub fn artifact_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{}.json", stem))
}

/// Write `record` to `<output_dir>/<stem>.json`
///
/// The JSON goes to a temporary file in the same directory which is then
/// renamed over the target, so readers never see a partial artifact.
pub fn write_artifact(
    output_dir: &Path,
    stem: &str,
    record: &ExtractionRecord,
) -> Result<PathBuf, PipelineError> {
    let json = render_artifact(record).map_err(|e| PipelineError::new(Stage::Persist, e))?;
    let target = artifact_path(output_dir, stem);

    let mut staged =
        NamedTempFile::new_in(output_dir).map_err(|e| PipelineError::new(Stage::Persist, e))?;
    staged
        .write_all(json.as_bytes())
        .and_then(|_| staged.flush())
        .map_err(|e| PipelineError::new(Stage::Persist, e))?;
    staged
        .persist(&target)
        .map_err(|e| PipelineError::new(Stage::Persist, e.error))?;

    Ok(target)
}

/// Load an artifact back into a record
///
/// String values become text; any other JSON value is kept as its JSON text.
pub fn load_artifact(path: &Path) -> Result<ExtractionRecord, PipelineError> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::new(Stage::Store, e))?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| PipelineError::new(Stage::Store, e))?;

    Ok(object
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (name, FieldValue::Text(text))
        })
        .collect())
}

/// Upsert every artifact into `store`
///
/// A document whose artifact cannot be loaded or stored is moved from the
/// succeeded to the failed tally; the remaining artifacts are still stored.
pub fn persist_artifacts<S>(store: &mut S, artifacts: &[ArtifactRef], report: &mut ProcessingReport)
where
    S: RecordStore,
    S::Error: Display,
{
    let mut inserted = 0usize;
    let mut updated = 0usize;

    for artifact in artifacts {
        let label = format!("[{}]", artifact.file_name);
        let result = load_artifact(&artifact.path).and_then(|record| {
            store.upsert(&record).map_err(|e| {
                PipelineError::new(Stage::Store, ErrorKind::Store(e.to_string()))
            })
        });

        match result {
            Ok(UpsertOutcome::Inserted(id)) => {
                inserted += 1;
                info!("{} Inserted row {}", label, id);
            }
            Ok(UpsertOutcome::Updated(id)) => {
                updated += 1;
                info!("{} Updated row {}", label, id);
            }
            Err(e) => {
                error!("{} {}", label, e);
                report.mark_persist_failure(artifact.file_name.clone());
            }
        }
    }

    info!(
        "Stored {} artifacts ({} inserted, {} updated)",
        inserted + updated,
        inserted,
        updated
    );
}

/// Close the store once the database phase is over
///
/// A failed close is logged and recorded on the report so the run still ends
/// with its summary.
pub fn close_store<S>(store: S, report: &mut ProcessingReport)
where
    S: RecordStore,
    S::Error: Display,
{
    if let Err(e) = store.close() {
        let err = PipelineError::new(Stage::Store, ErrorKind::Store(e.to_string()));
        error!("Closing the database: {}", err);
        report.record_storage_error(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> ExtractionRecord {
        let mut record = ExtractionRecord::new();
        record.set_text("title_name", "스마트공장 지원사업");
        record.set_text("area_name", "");
        record.set_text("original_file_name", "notice.md");
        record
    }

    #[test]
    fn test_render_keeps_order_and_non_ascii() {
        let json = render_artifact(&record()).unwrap();
        let title = json.find("title_name").unwrap();
        let area = json.find("area_name").unwrap();
        let key = json.find("original_file_name").unwrap();

        assert!(title < area && area < key);
        assert!(json.contains("스마트공장 지원사업"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(dir.path(), "notice", &record()).unwrap();

        assert_eq!(path, dir.path().join("notice.json"));
        let loaded = load_artifact(&path).unwrap();
        assert_eq!(loaded.text("title_name"), Some("스마트공장 지원사업"));
        assert_eq!(loaded.text("area_name"), Some(""));

        // Only the artifact remains; the staging file was renamed
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "notice", &record()).unwrap();

        let mut changed = record();
        changed.set_text("area_name", "서울");
        let path = write_artifact(dir.path(), "notice", &changed).unwrap();

        assert_eq!(load_artifact(&path).unwrap().text("area_name"), Some("서울"));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = write_artifact(&dir.path().join("absent"), "notice", &record()).unwrap_err();
        assert_eq!(err.stage, Stage::Persist);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_artifact(&path).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
    }
}
