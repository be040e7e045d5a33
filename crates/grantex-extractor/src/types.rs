//! Result types for extraction

use grantex_domain::ExtractionRecord;

/// How an extraction ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// The model answered with a usable JSON object
    Extracted {
        /// Number of remote calls made (1-based)
        attempts: u32,
    },

    /// Every attempt failed; the record is the all-empty placeholder
    Degraded {
        /// Number of remote calls made
        attempts: u32,
        /// Error from the final attempt
        last_error: String,
    },
}

/// Output of `ExtractionEngine::extract`
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Extracted fields
    pub record: ExtractionRecord,

    /// Whether the record came from the model or is a placeholder
    pub status: ExtractionStatus,
}

impl Extraction {
    /// Whether every attempt failed
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ExtractionStatus::Degraded { .. })
    }

    /// Number of remote calls that were made
    pub fn attempts(&self) -> u32 {
        match self.status {
            ExtractionStatus::Extracted { attempts } => attempts,
            ExtractionStatus::Degraded { attempts, .. } => attempts,
        }
    }
}
