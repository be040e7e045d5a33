//! Batch tallies

use grantex_convert::SourceFormat;
use std::collections::HashMap;
use std::time::Duration;

/// Tallies collected during one batch run
///
/// Updated only by the collector that drains finished documents, never from
/// inside a worker.
#[derive(Debug, Clone, Default)]
pub struct ProcessingReport {
    /// Documents submitted
    pub total: usize,

    /// Documents whose artifact was written (and stored, if persisted)
    pub succeeded: usize,

    /// Documents that failed at any stage
    pub failed: usize,

    /// File names of failed documents, in the order they failed
    pub failed_documents: Vec<String>,

    /// Fallback conversions attempted per format
    pub fallbacks_attempted: HashMap<SourceFormat, usize>,

    /// Extractions that ran out of attempts and returned an empty record
    pub degraded_extractions: usize,

    /// Database problems not tied to a single document
    pub storage_errors: Vec<String>,

    /// Wall-clock time of the batch
    pub elapsed: Duration,
}

impl ProcessingReport {
    /// Create an empty report for `total` documents
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Record a document that produced its artifact
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Record a failed document
    pub fn record_failure(&mut self, file_name: impl Into<String>) {
        self.failed += 1;
        self.failed_documents.push(file_name.into());
    }

    /// Record fallback conversions attempted for one document
    pub fn record_fallback(&mut self, format: SourceFormat, count: usize) {
        if count > 0 {
            *self.fallbacks_attempted.entry(format).or_insert(0) += count;
        }
    }

    /// Record degraded extractions for one document
    pub fn record_degraded(&mut self, count: usize) {
        self.degraded_extractions += count;
    }

    /// Move a document that succeeded during extraction to the failed tally
    ///
    /// Used when the database phase cannot store its artifact.
    pub fn mark_persist_failure(&mut self, file_name: impl Into<String>) {
        self.succeeded = self.succeeded.saturating_sub(1);
        self.record_failure(file_name);
    }

    /// Record a database problem that affects the run as a whole
    pub fn record_storage_error(&mut self, message: impl Into<String>) {
        self.storage_errors.push(message.into());
    }

    /// Fallback conversions attempted for `format`
    pub fn fallbacks_for(&self, format: SourceFormat) -> usize {
        self.fallbacks_attempted.get(&format).copied().unwrap_or(0)
    }

    /// Fallback conversions attempted across all formats
    pub fn total_fallbacks(&self) -> usize {
        self.fallbacks_attempted.values().sum()
    }

    /// Percentage of submitted documents that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64 * 100.0
    }

    /// Generate a summary of the batch
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Processing Summary".to_string(),
            "==================".to_string(),
            format!("Total documents: {}", self.total),
            format!("Succeeded: {}", self.succeeded),
            format!("Failed: {}", self.failed),
            format!("Success rate: {:.1}%", self.success_rate()),
            format!("Elapsed: {:.2}s", self.elapsed.as_secs_f64()),
        ];

        if self.degraded_extractions > 0 {
            lines.push(format!("Degraded extractions: {}", self.degraded_extractions));
        }

        if !self.fallbacks_attempted.is_empty() {
            lines.push(String::new());
            lines.push("Fallback conversions:".to_string());
            for format in [SourceFormat::Pdf, SourceFormat::Hwp] {
                let count = self.fallbacks_for(format);
                if count > 0 {
                    lines.push(format!("  {}: {}", format, count));
                }
            }
        }

        if !self.failed_documents.is_empty() {
            lines.push(String::new());
            lines.push("Failed documents:".to_string());
            for name in &self.failed_documents {
                lines.push(format!("  {}", name));
            }
        }

        if !self.storage_errors.is_empty() {
            lines.push(String::new());
            lines.push("Storage errors:".to_string());
            for message in &self.storage_errors {
                lines.push(format!("  {}", message));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tallies() {
        let mut report = ProcessingReport::new(3);
        report.record_success();
        report.record_success();
        report.record_failure("c.md");

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failed_documents, vec!["c.md".to_string()]);
    }

    #[test]
    fn test_success_rate() {
        let mut report = ProcessingReport::new(4);
        assert_eq!(report.success_rate(), 0.0);
        report.record_success();
        assert_eq!(report.success_rate(), 25.0);
        assert_eq!(ProcessingReport::default().success_rate(), 0.0);
    }

    #[test]
    fn test_fallback_counts() {
        let mut report = ProcessingReport::new(2);
        report.record_fallback(SourceFormat::Pdf, 1);
        report.record_fallback(SourceFormat::Pdf, 1);
        report.record_fallback(SourceFormat::Hwp, 0);

        assert_eq!(report.fallbacks_for(SourceFormat::Pdf), 2);
        assert_eq!(report.fallbacks_for(SourceFormat::Hwp), 0);
        assert_eq!(report.total_fallbacks(), 2);
    }

    #[test]
    fn test_persist_failure_moves_document() {
        let mut report = ProcessingReport::new(2);
        report.record_success();
        report.record_success();
        report.mark_persist_failure("b.md");

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded + report.failed, report.total);
    }

    #[test]
    fn test_summary() {
        let mut report = ProcessingReport::new(2);
        report.record_success();
        report.record_failure("broken.md");
        report.record_fallback(SourceFormat::Pdf, 1);
        report.record_degraded(1);

        let summary = report.summary();
        assert!(summary.contains("Total documents: 2"));
        assert!(summary.contains("Success rate: 50.0%"));
        assert!(summary.contains("PDF: 1"));
        assert!(summary.contains("Degraded extractions: 1"));
        assert!(summary.contains("  broken.md"));
        assert!(!summary.contains("Storage errors"));
    }

    #[test]
    fn test_storage_error_keeps_document_tallies() {
        let mut report = ProcessingReport::new(1);
        report.record_success();
        report.record_storage_error("close failed: disk I/O error");

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 0);
        let summary = report.summary();
        assert!(summary.contains("Storage errors:\n  close failed: disk I/O error"));
    }
}
