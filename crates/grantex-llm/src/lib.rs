//! Grantex LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `grantex-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use grantex_llm::MockProvider;
//! use grantex_domain::traits::LlmProvider;
//!
//! # tokio_test_block(async {
//! let provider = MockProvider::new(r#"{"title_name": "Export Voucher"}"#);
//! let result = provider.generate("extract", "some notice").await.unwrap();
//! assert!(result.contains("Export Voucher"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use grantex_domain::traits::LlmProvider;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail,
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, Scripted)>,
    failures_remaining: Option<usize>,
    call_count: usize,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without any network calls. Rules match
/// when the prompt *contains* the rule's key, checked in insertion order; the
/// default response is used otherwise.
///
/// Clones share state, so a test can keep a handle to inspect call counts
/// after moving the provider into an engine.
///
/// # Examples
///
/// ```
/// use grantex_llm::MockProvider;
///
/// let mut provider = MockProvider::new("{}");
/// provider.add_response("Busan", r#"{"area_name": "Busan"}"#);
/// provider.add_error("corrupted");
/// provider.fail_first(2);
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    model: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model: "mock".to_string(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a provider whose every call fails
    pub fn failing() -> Self {
        let provider = Self::new("");
        provider.lock().failures_remaining = Some(usize::MAX);
        provider
    }

    /// Respond with `response` when the prompt contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.lock()
            .rules
            .push((needle.into(), Scripted::Respond(response.into())));
    }

    /// Fail when the prompt contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.lock().rules.push((needle.into(), Scripted::Fail));
    }

    /// Fail the next `n` calls regardless of prompt
    pub fn fail_first(&mut self, n: usize) {
        self.lock().failures_remaining = Some(n);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().call_count
    }

    /// Reset the call count and recorded prompts
    pub fn reset_call_count(&self) {
        let mut state = self.lock();
        state.call_count = 0;
        state.prompts.clear();
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a test already panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.lock();
        state.call_count += 1;
        state.prompts.push(prompt.to_string());

        if let Some(remaining) = state.failures_remaining.as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LlmError::Communication("Mock transport failure".to_string()));
            }
        }

        let scripted = state
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, _instructions: &str, prompt: &str) -> Result<String, Self::Error> {
        self.respond(prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
