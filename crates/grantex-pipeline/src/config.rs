//! Configuration for batch processing
//!
//! Defines where documents come from, where artifacts go, how many documents
//! run at once and which fallback formats are tried.

use grantex_convert::{SiblingSelection, SourceFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the ExtractionOrchestrator
///
/// # Examples
///
/// ```
/// use grantex_pipeline::PipelineConfig;
///
/// // Default configuration (4 workers, PDF then HWP fallback)
/// let config = PipelineConfig::default();
/// assert_eq!(config.max_workers, 4);
///
/// // One document at a time, in input order
/// let config = PipelineConfig::sequential();
/// assert!(!config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory searched recursively for markdown announcements
    pub input_dir: PathBuf,

    /// Directory receiving `<stem>.json` artifacts
    /// Default: empty, meaning the input directory
    pub output_dir: PathBuf,

    /// Root of the per-document sibling folders (`<root>/<stem>/`)
    /// Default: `data`
    pub documents_root: PathBuf,

    /// File-name glob for input documents
    /// Default: `*.md`
    pub file_pattern: String,

    /// Process documents concurrently
    pub parallel: bool,

    /// Upper bound on documents in flight when parallel
    pub max_workers: usize,

    /// Fallback formats, tried in order when extraction is incomplete
    pub fallback_order: Vec<SourceFormat>,

    /// Tie-break when several PDFs are found
    pub pdf_selection: SiblingSelection,

    /// Tie-break when several HWP files are found
    pub hwp_selection: SiblingSelection,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::new(),
            documents_root: PathBuf::from("data"),
            file_pattern: "*.md".to_string(),
            parallel: true,
            max_workers: 4,
            fallback_order: vec![SourceFormat::Pdf, SourceFormat::Hwp],
            pdf_selection: SiblingSelection::FirstFound,
            hwp_selection: SiblingSelection::NameSimilarity,
        }
    }
}

impl PipelineConfig {
    /// Sequential configuration (documents processed one by one in input order)
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            max_workers: 1,
            ..Default::default()
        }
    }

    /// Directory artifacts are written to
    pub fn effective_output_dir(&self) -> &Path {
        if self.output_dir.as_os_str().is_empty() {
            &self.input_dir
        } else {
            &self.output_dir
        }
    }

    /// Selection rule configured for `format`
    pub fn selection_for(&self, format: SourceFormat) -> SiblingSelection {
        match format {
            SourceFormat::Pdf => self.pdf_selection,
            SourceFormat::Hwp => self.hwp_selection,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".to_string());
        }
        if self.file_pattern.trim().is_empty() {
            return Err("file_pattern must not be empty".to_string());
        }
        if let Err(e) = glob::Pattern::new(&self.file_pattern) {
            return Err(format!("invalid file_pattern '{}': {}", self.file_pattern, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.parallel);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.file_pattern, "*.md");
        assert_eq!(config.fallback_order, vec![SourceFormat::Pdf, SourceFormat::Hwp]);
        assert_eq!(config.pdf_selection, SiblingSelection::FirstFound);
        assert_eq!(config.hwp_selection, SiblingSelection::NameSimilarity);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sequential_config() {
        let config = PipelineConfig::sequential();
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_dir_defaults_to_input() {
        let config = PipelineConfig {
            input_dir: PathBuf::from("notices"),
            ..Default::default()
        };
        assert_eq!(config.effective_output_dir(), Path::new("notices"));

        let config = PipelineConfig {
            output_dir: PathBuf::from("out"),
            ..config
        };
        assert_eq!(config.effective_output_dir(), Path::new("out"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = PipelineConfig {
            max_workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            file_pattern: "[*.md".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = PipelineConfig {
            fallback_order: vec![SourceFormat::Hwp],
            pdf_selection: SiblingSelection::NameSimilarity,
            ..Default::default()
        };
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
        assert!(serialized.contains("\"hwp\""));
        assert!(serialized.contains("\"name_similarity\""));
    }
}
