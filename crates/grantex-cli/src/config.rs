//! Configuration management for the CLI.
//!
//! Values are layered: built-in defaults, then a TOML file, then command-line
//! flags (see `Cli::apply_overrides`).

use crate::error::{CliError, Result};
use grantex_convert::{SiblingSelection, SourceFormat};
use grantex_domain::{FieldSchema, FieldSpec, NormalizationRule};
use grantex_extractor::EngineConfig;
use grantex_pipeline::PipelineConfig;
use grantex_validator::{ValidationConfig, ValidatorPatterns};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "grantex.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input and output locations
    pub directories: DirectoriesConfig,

    /// Log level and optional log file
    pub logging: LoggingConfig,

    /// Remote model settings
    pub llm: LlmConfig,

    /// Worker pool settings
    pub parallel: ParallelConfig,

    /// Field vocabulary
    pub fields: FieldsConfig,

    /// Alternate-format fallback settings
    pub fallback: FallbackConfig,

    /// Validation policy and patterns
    pub validation: ValidationConfig,

    /// SQLite settings
    pub database: DatabaseConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoriesConfig {
    /// Directory searched for markdown announcements
    pub input_dir: PathBuf,

    /// Directory receiving JSON artifacts (empty: the input directory)
    pub output_dir: PathBuf,

    /// Root of the per-document PDF/HWP folders
    pub documents_root: PathBuf,

    /// File-name glob for input documents
    pub file_pattern: String,
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            documents_root: PathBuf::from("data"),
            file_pattern: "*.md".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Also append plain log output to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Which provider answers extraction prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    OpenAi,
    /// Offline provider answering `{}` to every prompt
    Mock,
}

/// Remote model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider kind
    pub provider: ProviderKind,

    /// Model identifier
    pub model: String,

    /// API key (usually supplied through `OPENAI_API_KEY`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Alternate OpenAI-compatible endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Completion token budget
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Attempts per extraction before degrading
    pub retry_attempts: u32,

    /// Base backoff delay in seconds
    pub retry_delay_secs: f64,

    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// Longest canonical text sent to the model, in characters
    pub max_text_length: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-3.5-turbo".to_string(),
            api_key: String::new(),
            base_url: None,
            max_tokens: 4000,
            temperature: 0.3,
            retry_attempts: engine.retry_attempts,
            retry_delay_secs: engine.retry_delay_secs,
            request_timeout_secs: 120,
            max_text_length: engine.max_text_length,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Process documents concurrently
    pub enabled: bool,

    /// Documents in flight at once
    pub max_workers: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_workers: 4,
        }
    }
}

/// Field vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Fields that must be non-blank for a document to count as complete
    pub required: Vec<String>,

    /// Fields extracted when present
    pub optional: Vec<String>,

    /// Prompt hints overriding the built-in ones
    pub hints: BTreeMap<String, String>,

    /// Normalization rules by field (`none`, `email`, `phone`)
    pub rules: BTreeMap<String, String>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            required: names(&[
                "title_name",
                "reception_institution_name",
                "support_content",
                "reception_start_date",
                "reception_end_date",
            ]),
            optional: names(&[
                "sme_subvention_id",
                "business_overview_content",
                "notice_date",
                "support_qualification_content",
                "registered_at",
                "support_amount",
                "area_name",
                "url_address",
                "application_way_content",
                "responsible_division_name",
                "responsible_person_name",
                "responsible_person_email",
                "tel_number",
            ]),
            hints: BTreeMap::new(),
            rules: BTreeMap::new(),
        }
    }
}

/// Alternate-format fallback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Formats tried, in order, when required fields are missing
    pub order: Vec<SourceFormat>,

    /// Tie-break among several PDFs
    pub pdf_selection: SiblingSelection,

    /// Tie-break among several HWP files
    pub hwp_selection: SiblingSelection,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            order: pipeline.fallback_order,
            pdf_selection: pipeline.pdf_selection,
            hwp_selection: pipeline.hwp_selection,
        }
    }
}

/// SQLite settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file
    pub path: PathBuf,

    /// Table holding one row per document
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("grantex.db"),
            table: grantex_store::DEFAULT_TABLE.to_string(),
        }
    }
}

impl AppConfig {
    /// Per-user configuration file (`~/.grantex/config.toml`).
    pub fn user_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".grantex").join("config.toml"))
    }

    /// Locate the configuration file to load, if any.
    ///
    /// An explicit path must exist. Otherwise `./grantex.toml` is preferred
    /// over the per-user file.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(Some(local));
        }

        Ok(Self::user_path().filter(|path| path.exists()))
    }

    /// Load configuration from the resolved file, or defaults when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match Self::resolve_path(explicit)? {
            Some(path) => {
                let contents = fs::read_to_string(&path)?;
                Ok((Self::from_toml(&contents)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Render configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Check every setting that would otherwise fail later in the run.
    pub fn validate(&self) -> Result<()> {
        if self.parallel.max_workers == 0 {
            return Err(CliError::Config("parallel.max_workers must be greater than 0".into()));
        }
        self.engine_config().validate().map_err(CliError::Config)?;
        self.pipeline_config().validate().map_err(CliError::Config)?;

        if !self.llm.temperature.is_finite() || self.llm.temperature < 0.0 {
            return Err(CliError::Config("llm.temperature must be a non-negative number".into()));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(CliError::Config("llm.request_timeout_secs must be greater than 0".into()));
        }
        if self.fields.required.is_empty() && self.fields.optional.is_empty() {
            return Err(CliError::Config("fields: at least one field must be configured".into()));
        }

        let schema = self.schema()?;
        for name in self.fields.hints.keys().chain(self.fields.rules.keys()) {
            if !schema.is_known(name) {
                return Err(CliError::Config(format!(
                    "fields: '{}' has a hint or rule but is not a configured field",
                    name
                )));
            }
        }

        ValidatorPatterns::compile(&self.validation.patterns)?;
        Ok(())
    }

    /// Build the field vocabulary.
    pub fn schema(&self) -> Result<FieldSchema> {
        let required = self.fields.required.iter().map(|name| (name, true));
        let optional = self.fields.optional.iter().map(|name| (name, false));

        let mut specs = Vec::new();
        for (name, is_required) in required.chain(optional) {
            let mut spec = FieldSpec::new(name.trim(), is_required);
            if let Some(hint) = self.fields.hints.get(name) {
                spec = spec.with_hint(hint.clone());
            }
            if let Some(rule) = self.fields.rules.get(name) {
                let rule = NormalizationRule::parse(rule).ok_or_else(|| {
                    CliError::Config(format!("fields.rules.{}: unknown rule '{}'", name, rule))
                })?;
                spec = spec.with_rule(rule);
            }
            specs.push(spec);
        }

        Ok(FieldSchema::new(specs)?)
    }

    /// Extraction engine settings.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            retry_attempts: self.llm.retry_attempts,
            retry_delay_secs: self.llm.retry_delay_secs,
            max_text_length: self.llm.max_text_length,
        }
    }

    /// Orchestrator settings.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input_dir: self.directories.input_dir.clone(),
            output_dir: self.directories.output_dir.clone(),
            documents_root: self.directories.documents_root.clone(),
            file_pattern: self.directories.file_pattern.clone(),
            parallel: self.parallel.enabled,
            max_workers: self.parallel.max_workers,
            fallback_order: self.fallback.order.clone(),
            pdf_selection: self.fallback.pdf_selection,
            hwp_selection: self.fallback.hwp_selection,
        }
    }
}
