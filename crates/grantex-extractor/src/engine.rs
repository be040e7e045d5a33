//! Core ExtractionEngine implementation

use crate::config::EngineConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::{PromptBuilder, SYSTEM_INSTRUCTIONS};
use crate::types::{Extraction, ExtractionStatus};
use grantex_domain::traits::LlmProvider;
use grantex_domain::{ExtractionRecord, FieldSchema};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The ExtractionEngine turns canonical text into an `ExtractionRecord`
///
/// One prompt is sent per attempt. Transport failures and malformed responses
/// are retried with exponential backoff; once attempts run out the engine
/// yields an all-empty record marked `ExtractionStatus::Degraded` instead of
/// an error.
pub struct ExtractionEngine<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    schema: FieldSchema,
    config: EngineConfig,
}

impl<L> ExtractionEngine<L>
where
    L: LlmProvider,
{
    /// Create a new ExtractionEngine
    pub fn new(llm_provider: L, schema: FieldSchema, config: EngineConfig) -> Self {
        Self::with_shared_provider(Arc::new(llm_provider), schema, config)
    }

    /// Create an engine around a provider that is shared with other owners
    pub fn with_shared_provider(
        llm_provider: Arc<L>,
        schema: FieldSchema,
        config: EngineConfig,
    ) -> Self {
        Self {
            llm_provider,
            schema,
            config,
        }
    }

    /// Field vocabulary the engine asks for
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract fields from canonical text
    ///
    /// Never fails: see `ExtractionStatus` for how the call ended.
    pub async fn extract(&self, text: &str) -> Extraction {
        let text = self.truncate(text);
        let prompt = PromptBuilder::new(text, &self.schema).build();

        debug!(
            "Prompt length: {} chars, model '{}'",
            prompt.len(),
            self.llm_provider.model_name()
        );

        let attempts = self.config.retry_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match self.attempt(&prompt).await {
                Ok(record) => {
                    info!(
                        "Extracted {} fields (attempt {}/{})",
                        record.len(),
                        attempt + 1,
                        attempts
                    );
                    return Extraction {
                        record,
                        status: ExtractionStatus::Extracted {
                            attempts: attempt + 1,
                        },
                    };
                }
                Err(e) => {
                    warn!("Extraction attempt {}/{} failed: {}", attempt + 1, attempts, e);
                    last_error = e.to_string();

                    if attempt + 1 < attempts {
                        let delay = self.config.backoff_delay(attempt);
                        debug!("Retrying in {:?}", delay);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        warn!(
            "All {} extraction attempts failed, returning empty record",
            attempts
        );
        Extraction {
            record: ExtractionRecord::empty_for(&self.schema),
            status: ExtractionStatus::Degraded {
                attempts,
                last_error,
            },
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<ExtractionRecord, ExtractorError> {
        let response = self
            .llm_provider
            .generate(SYSTEM_INSTRUCTIONS, prompt)
            .await
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!("LLM response length: {} chars", response.len());

        parse_llm_response(&response)
    }

    fn truncate<'t>(&self, text: &'t str) -> &'t str {
        match text.char_indices().nth(self.config.max_text_length) {
            Some((byte_idx, _)) => {
                warn!(
                    "Text exceeds {} characters, truncating before extraction",
                    self.config.max_text_length
                );
                &text[..byte_idx]
            }
            None => text,
        }
    }
}
