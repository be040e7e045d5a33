//! OpenAI Provider Implementation
//!
//! Integration with the OpenAI chat completions API, or any server exposing
//! the same wire format.
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Configurable endpoint, model, temperature and token budget
//! - Per-request timeout
//!
//! One `generate` call is one HTTP attempt. Retry with backoff is the
//! extraction engine's job.
//!
//! # Examples
//!
//! ```no_run
//! use grantex_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-4o-mini").unwrap();
//! ```

use crate::LlmError;
use grantex_domain::traits::LlmProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default completion token budget
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider against the default endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(api_key, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a specific per-request timeout
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        })
    }

    /// Point the provider at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Send one chat completion request
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable or times out
    /// - The API key is rejected or the model is unknown
    /// - The rate limit is hit
    /// - The response body is not a chat completion or has no content
    pub async fn complete(&self, instructions: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instructions,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status {
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    LlmError::Authentication(error_text)
                }
                reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
                reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                _ => LlmError::Communication(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no content".to_string()))?;

        debug!("Completion received ({} chars)", content.len());

        Ok(content)
    }
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    async fn generate(&self, instructions: &str, prompt: &str) -> Result<String, Self::Error> {
        self.complete(instructions, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAiProvider::new("key", "gpt-4o-mini").unwrap();
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.model, "gpt-4o-mini");
        assert_eq!(provider.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_openai_provider_builders() {
        let provider = OpenAiProvider::new("key", "m")
            .unwrap()
            .with_base_url("http://localhost:8000/v1/")
            .with_temperature(0.0)
            .with_max_tokens(512);
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
        assert_eq!(provider.temperature, 0.0);
        assert_eq!(provider.max_tokens, 512);
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.3,
            max_tokens: 10,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"a\":\"b\"}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(r#"{"a":"b"}"#));
    }

    #[tokio::test]
    async fn test_openai_error_handling() {
        // Use an unroutable endpoint to trigger a transport error
        let provider = OpenAiProvider::with_timeout("key", "m", Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let result = provider.generate("", "test").await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }
}
