//! Per-document state machine and the bounded worker pool

use crate::artifact::{write_artifact, ArtifactRef};
use crate::config::PipelineConfig;
use crate::error::{ErrorKind, PipelineError, Stage};
use crate::report::ProcessingReport;
use grantex_convert::{
    AlternateFormatConverter, HwpConverter, PdfConverter, SiblingSelection, SourceFormat,
};
use grantex_domain::{
    DocumentUnit, ExtractionRecord, LlmProvider, FILE_PATH_FIELD, ORIGINAL_FILE_NAME_FIELD,
};
use grantex_extractor::{DocumentNormalizer, Extraction, ExtractionEngine};
use grantex_validator::RecordValidator;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// How one document ended
#[derive(Debug)]
pub struct DocumentOutcome {
    /// File name of the document
    pub file_name: String,
    /// The written artifact, or the stage that failed
    pub result: Result<ArtifactRef, PipelineError>,
    /// Fallback conversions attempted, in order
    pub fallbacks: Vec<SourceFormat>,
    /// Extractions that degraded to an empty record
    pub degraded: usize,
}

impl DocumentOutcome {
    fn failed(file_name: String, error: PipelineError) -> Self {
        Self {
            file_name,
            result: Err(error),
            fallbacks: Vec::new(),
            degraded: 0,
        }
    }

    /// Whether the artifact was written
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    /// Tallies for the batch
    pub report: ProcessingReport,
    /// Artifacts written, sorted by document file name
    pub artifacts: Vec<ArtifactRef>,
}

/// Stage a document is currently in, readable after its task panics
#[derive(Debug, Clone)]
struct StageTracker(Arc<Mutex<Stage>>);

impl Default for StageTracker {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Stage::Read)))
    }
}

impl StageTracker {
    fn enter(&self, stage: Stage) {
        match self.0.lock() {
            Ok(mut current) => *current = stage,
            Err(poisoned) => *poisoned.into_inner() = stage,
        }
    }

    fn current(&self) -> Stage {
        match self.0.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Debug, Default)]
struct Progress {
    fallbacks: Vec<SourceFormat>,
    degraded: usize,
    stage: StageTracker,
}

impl Progress {
    fn tracked(stage: StageTracker) -> Self {
        Self {
            stage,
            ..Default::default()
        }
    }

    fn note(&mut self, extraction: &Extraction) {
        if extraction.is_degraded() {
            self.degraded += 1;
        }
    }
}

enum FallbackAttempt {
    NoSibling,
    Converted(String),
    Failed(String),
}

/// Drives documents through read, extract, fallback, validate and write
///
/// Cloning is cheap: the engine, validator and converters are shared.
///
/// # Examples
///
/// ```no_run
/// use grantex_domain::FieldSchema;
/// use grantex_extractor::{EngineConfig, ExtractionEngine};
/// use grantex_llm::MockProvider;
/// use grantex_pipeline::{discover_documents, ExtractionOrchestrator, PipelineConfig};
/// use grantex_validator::RecordValidator;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = FieldSchema::from_names(&["title_name"], &["area_name"])?;
/// let engine =
///     ExtractionEngine::new(MockProvider::default(), schema.clone(), EngineConfig::default());
/// let validator = RecordValidator::with_defaults(schema)?;
/// let config = PipelineConfig::default();
///
/// let orchestrator = ExtractionOrchestrator::new(engine, validator, config.clone())?;
/// let documents = discover_documents(&config.input_dir, &config.file_pattern)?;
/// let outcome = orchestrator.run_batch(documents).await;
/// println!("{}", outcome.report.summary());
/// # Ok(())
/// # }
/// ```
pub struct ExtractionOrchestrator<L>
where
    L: LlmProvider + 'static,
{
    engine: Arc<ExtractionEngine<L>>,
    validator: Arc<RecordValidator>,
    normalizer: DocumentNormalizer,
    converters: Vec<Arc<dyn AlternateFormatConverter>>,
    config: Arc<PipelineConfig>,
}

impl<L> Clone for ExtractionOrchestrator<L>
where
    L: LlmProvider + 'static,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            validator: Arc::clone(&self.validator),
            normalizer: self.normalizer.clone(),
            converters: self.converters.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<L> ExtractionOrchestrator<L>
where
    L: LlmProvider + 'static,
{
    /// Create an orchestrator with the PDF and HWP converters
    ///
    /// Validates the configuration and creates the output directory.
    pub fn new(
        engine: ExtractionEngine<L>,
        validator: RecordValidator,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::new(Stage::Setup, ErrorKind::Config(e)))?;

        let output_dir = config.effective_output_dir();
        std::fs::create_dir_all(output_dir).map_err(|e| PipelineError::new(Stage::Setup, e))?;
        debug!("Artifacts go to {}", output_dir.display());

        Ok(Self {
            engine: Arc::new(engine),
            validator: Arc::new(validator),
            normalizer: DocumentNormalizer::new(),
            converters: vec![Arc::new(PdfConverter::new()), Arc::new(HwpConverter::new())],
            config: Arc::new(config),
        })
    }

    /// Use `converter` for its format, replacing the built-in one
    pub fn with_converter(mut self, converter: Arc<dyn AlternateFormatConverter>) -> Self {
        let format = converter.format();
        self.converters.retain(|existing| existing.format() != format);
        self.converters.push(converter);
        self
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every document and collect the report
    ///
    /// Documents run concurrently (at most `max_workers` in flight) when
    /// parallelism is enabled and there is more than one; otherwise one by
    /// one in input order. A failed or panicking document is counted and the
    /// batch continues.
    pub async fn run_batch(&self, documents: Vec<DocumentUnit>) -> BatchOutcome {
        let started = Instant::now();
        let mut report = ProcessingReport::new(documents.len());
        let mut artifacts = Vec::new();

        if documents.is_empty() {
            warn!("No documents to process");
            return BatchOutcome { report, artifacts };
        }

        if self.config.parallel && documents.len() > 1 {
            info!(
                "Processing {} documents with up to {} workers",
                documents.len(),
                self.config.max_workers
            );
            let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
            let mut tasks = JoinSet::new();

            for doc in documents {
                let orchestrator = self.clone();
                let semaphore = Arc::clone(&semaphore);
                tasks.spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            let error =
                                PipelineError::new(Stage::Setup, ErrorKind::Worker(e.to_string()));
                            return DocumentOutcome::failed(doc.file_name, error);
                        }
                    };
                    orchestrator.process_isolated(doc).await
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(outcome) => collect(outcome, &mut report, &mut artifacts),
                    Err(e) => {
                        error!("Worker task failed: {}", e);
                        report.record_failure("<unknown>");
                    }
                }
            }
        } else {
            info!("Processing {} documents sequentially", documents.len());
            for doc in documents {
                let outcome = self.process_isolated(doc).await;
                collect(outcome, &mut report, &mut artifacts);
            }
        }

        artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        report.elapsed = started.elapsed();
        info!(
            "Batch finished: {}/{} succeeded in {:.2}s",
            report.succeeded,
            report.total,
            report.elapsed.as_secs_f64()
        );
        BatchOutcome { report, artifacts }
    }

    /// Run one document on its own task so a panic only fails that document
    async fn process_isolated(&self, doc: DocumentUnit) -> DocumentOutcome {
        let file_name = doc.file_name.clone();
        let orchestrator = self.clone();
        let stage = StageTracker::default();
        let progress = Progress::tracked(stage.clone());
        let handle = tokio::spawn(async move { orchestrator.process_with(&doc, progress).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let stage = stage.current();
                error!("[{}] Worker failed during {}: {}", file_name, stage, e);
                DocumentOutcome::failed(
                    file_name,
                    PipelineError::new(stage, ErrorKind::Worker(e.to_string())),
                )
            }
        }
    }

    /// Process one document through to its JSON artifact
    pub async fn process_document(&self, doc: &DocumentUnit) -> DocumentOutcome {
        self.process_with(doc, Progress::default()).await
    }

    async fn process_with(&self, doc: &DocumentUnit, mut progress: Progress) -> DocumentOutcome {
        let label = doc.label();
        info!("{} Processing {}", label, doc.path.display());

        let result = match self.build_tracked(doc, &label, &mut progress).await {
            Ok(record) => {
                progress.stage.enter(Stage::Persist);
                self.write(doc, record).await
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(artifact) => info!("{} Wrote {}", label, artifact.path.display()),
            Err(e) => error!("{} {}", label, e),
        }

        DocumentOutcome {
            file_name: doc.file_name.clone(),
            result,
            fallbacks: progress.fallbacks,
            degraded: progress.degraded,
        }
    }

    /// Build the validated record for one document without writing it
    pub async fn build_record(
        &self,
        doc: &DocumentUnit,
    ) -> Result<ExtractionRecord, PipelineError> {
        let mut progress = Progress::default();
        self.build_tracked(doc, &doc.label(), &mut progress).await
    }

    async fn build_tracked(
        &self,
        doc: &DocumentUnit,
        label: &str,
        progress: &mut Progress,
    ) -> Result<ExtractionRecord, PipelineError> {
        progress.stage.enter(Stage::Read);
        let raw = tokio::fs::read_to_string(&doc.path)
            .await
            .map_err(|e| PipelineError::new(Stage::Read, e))?;
        progress.stage.enter(Stage::Normalize);
        let text = self.normalizer.normalize(&raw);

        progress.stage.enter(Stage::Extract);
        let extraction = self.engine.extract(&text).await;
        progress.note(&extraction);
        if extraction.is_degraded() {
            warn!("{} Extraction degraded after {} attempts", label, extraction.attempts());
        }
        let mut record = extraction.record;

        progress.stage.enter(Stage::CompletenessCheck);
        let schema = self.engine.schema();
        if schema.is_complete(&record) {
            debug!("{} All required fields present", label);
        } else {
            info!(
                "{} Missing required fields: {}",
                label,
                schema.missing_required(&record).join(", ")
            );
            for format in self.config.fallback_order.iter().copied() {
                self.fallback(format, doc, label, &mut record, progress).await;
            }
        }

        progress.stage.enter(Stage::Validate);
        record.set_text(ORIGINAL_FILE_NAME_FIELD, doc.file_name.clone());
        let absolute = std::path::absolute(&doc.path).unwrap_or_else(|_| doc.path.clone());
        record.set_text(FILE_PATH_FIELD, absolute.to_string_lossy());

        self.validator
            .validate_and_normalize(&record, label)
            .map_err(|e| PipelineError::new(Stage::Validate, e))
    }

    async fn fallback(
        &self,
        format: SourceFormat,
        doc: &DocumentUnit,
        label: &str,
        record: &mut ExtractionRecord,
        progress: &mut Progress,
    ) {
        progress.stage.enter(Stage::Fallback(format));
        let Some(converter) = self
            .converters
            .iter()
            .find(|c| c.format() == format)
            .cloned()
        else {
            warn!("{} No {} converter configured", label, format);
            return;
        };

        let root = self.config.documents_root.clone();
        let file_name = doc.file_name.clone();
        let stem = doc.stem.clone();
        let rule = self.config.selection_for(format);

        let attempt = tokio::task::spawn_blocking(move || {
            convert_sibling(converter.as_ref(), &root, &file_name, &stem, rule)
        })
        .await
        .unwrap_or_else(|e| FallbackAttempt::Failed(format!("conversion task failed: {}", e)));

        let text = match attempt {
            FallbackAttempt::NoSibling => {
                info!("{} No {} sibling found", label, format);
                return;
            }
            FallbackAttempt::Failed(reason) => {
                progress.fallbacks.push(format);
                warn!("{} {} fallback unavailable: {}", label, format, reason);
                return;
            }
            FallbackAttempt::Converted(text) => {
                progress.fallbacks.push(format);
                text
            }
        };

        let extraction = self.engine.extract(&self.normalizer.normalize(&text)).await;
        progress.note(&extraction);

        progress.stage.enter(Stage::Merge);
        let adopted = record.merge_from(&extraction.record);
        if adopted.is_empty() {
            info!("{} {} fallback added no fields", label, format);
        } else {
            info!("{} {} fallback filled: {}", label, format, adopted.join(", "));
        }
    }

    async fn write(
        &self,
        doc: &DocumentUnit,
        record: ExtractionRecord,
    ) -> Result<ArtifactRef, PipelineError> {
        let output_dir = self.config.effective_output_dir().to_path_buf();
        let stem = doc.stem.clone();
        let path = tokio::task::spawn_blocking(move || write_artifact(&output_dir, &stem, &record))
            .await
            .map_err(|e| PipelineError::new(Stage::Persist, ErrorKind::Worker(e.to_string())))??;

        Ok(ArtifactRef {
            file_name: doc.file_name.clone(),
            path,
        })
    }
}

/// Find, select and convert a sibling inside a scratch directory
///
/// The scratch directory and everything the converter wrote into it are
/// removed before returning.
fn convert_sibling(
    converter: &dyn AlternateFormatConverter,
    root: &Path,
    file_name: &str,
    stem: &str,
    rule: SiblingSelection,
) -> FallbackAttempt {
    let candidates = converter.find_sibling_documents(root, file_name);
    let Some(source) = converter.select_sibling(&candidates, file_name, rule) else {
        return FallbackAttempt::NoSibling;
    };
    debug!("Converting {}", source.display());

    let scratch = match tempfile::TempDir::new() {
        Ok(dir) => dir,
        Err(e) => return FallbackAttempt::Failed(e.to_string()),
    };
    let target = scratch.path().join(format!("{}.md", stem));

    let written = match converter.convert(&source, Some(&target)) {
        Ok(path) => path,
        Err(e) => return FallbackAttempt::Failed(e.to_string()),
    };

    match std::fs::read_to_string(&written) {
        Ok(text) => FallbackAttempt::Converted(text),
        Err(e) => FallbackAttempt::Failed(format!("cannot read {}: {}", written.display(), e)),
    }
}

fn collect(
    outcome: DocumentOutcome,
    report: &mut ProcessingReport,
    artifacts: &mut Vec<ArtifactRef>,
) {
    for format in &outcome.fallbacks {
        report.record_fallback(*format, 1);
    }
    report.record_degraded(outcome.degraded);

    match outcome.result {
        Ok(artifact) => {
            report.record_success();
            artifacts.push(artifact);
        }
        Err(_) => report.record_failure(outcome.file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantex_convert::ConvertError;
    use grantex_domain::FieldSchema;
    use grantex_extractor::EngineConfig;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Answers with an incomplete record, panics when the prompt mentions `needle`
    struct Volatile {
        needle: &'static str,
    }

    impl LlmProvider for Volatile {
        type Error = String;

        async fn generate(&self, _instructions: &str, prompt: &str) -> Result<String, String> {
            if prompt.contains(self.needle) {
                panic!("provider exploded");
            }
            Ok(r#"{"title_name": "Partial"}"#.to_string())
        }

        fn model_name(&self) -> &str {
            "volatile"
        }
    }

    /// PDF converter that always produces the same markdown
    struct CannedPdf;

    impl AlternateFormatConverter for CannedPdf {
        fn format(&self) -> SourceFormat {
            SourceFormat::Pdf
        }

        fn default_selection(&self) -> SiblingSelection {
            SiblingSelection::FirstFound
        }

        fn convert(&self, _source: &Path, output: Option<&Path>) -> Result<PathBuf, ConvertError> {
            let target = output
                .map(Path::to_path_buf)
                .ok_or_else(|| ConvertError::Pdf("no target".to_string()))?;
            std::fs::write(&target, "converted pdf page")
                .map_err(|e| ConvertError::Pdf(e.to_string()))?;
            Ok(target)
        }
    }

    fn setup(needle: &'static str) -> (TempDir, ExtractionOrchestrator<Volatile>, DocumentUnit) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        let root = dir.path().join("data");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(root.join("notice")).unwrap();
        std::fs::write(input.join("notice.md"), "markdown body").unwrap();
        std::fs::write(root.join("notice").join("notice.pdf"), b"%PDF-1.4").unwrap();

        let schema = FieldSchema::from_names(&["title_name", "notice_date"], &[] as &[&str]).unwrap();
        let config = EngineConfig {
            retry_attempts: 1,
            retry_delay_secs: 0.0,
            ..Default::default()
        };
        let engine = ExtractionEngine::new(Volatile { needle }, schema.clone(), config);
        let validator = RecordValidator::with_defaults(schema).unwrap();
        let pipeline = PipelineConfig {
            input_dir: input.clone(),
            output_dir: dir.path().join("output"),
            documents_root: root,
            fallback_order: vec![SourceFormat::Pdf],
            ..Default::default()
        };
        let orchestrator = ExtractionOrchestrator::new(engine, validator, pipeline)
            .unwrap()
            .with_converter(Arc::new(CannedPdf));
        (dir, orchestrator, DocumentUnit::from_path(input.join("notice.md")))
    }

    #[tokio::test]
    async fn test_panic_in_first_extraction_is_tagged_extract() {
        let (_dir, orchestrator, doc) = setup("markdown body");

        let outcome = orchestrator.process_isolated(doc).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.stage, Stage::Extract);
        assert!(matches!(err.kind, ErrorKind::Worker(_)));
    }

    #[tokio::test]
    async fn test_panic_during_fallback_is_tagged_with_format() {
        let (_dir, orchestrator, doc) = setup("converted pdf page");

        let outcome = orchestrator.process_isolated(doc).await;

        let err = outcome.result.unwrap_err();
        assert_eq!(err.stage, Stage::Fallback(SourceFormat::Pdf));
        assert_eq!(err.to_string().split(':').next(), Some("PDF fallback failed"));
    }

    #[test]
    fn test_stage_tracker_follows_progress() {
        let tracker = StageTracker::default();
        assert_eq!(tracker.current(), Stage::Read);
        tracker.clone().enter(Stage::Merge);
        assert_eq!(tracker.current(), Stage::Merge);
    }
}
