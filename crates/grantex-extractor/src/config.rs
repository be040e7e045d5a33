//! Configuration for the ExtractionEngine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ExtractionEngine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of remote calls attempted before degrading
    pub retry_attempts: u32,

    /// Base backoff delay in seconds; attempt `n` waits `retry_delay * 2^n`
    pub retry_delay_secs: f64,

    /// Canonical text longer than this (characters) is truncated before prompting
    pub max_text_length: usize,
}

impl EngineConfig {
    /// Base backoff delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs.max(0.0))
    }

    /// Delay to wait after the failed attempt `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_delay().saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_attempts == 0 {
            return Err("retry_attempts must be greater than 0".to_string());
        }
        if !self.retry_delay_secs.is_finite() || self.retry_delay_secs < 0.0 {
            return Err("retry_delay_secs must be a non-negative number".to_string());
        }
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_secs: 5.0,
            max_text_length: 100_000,
        }
    }
}
