//! Command implementations.

mod extract;
mod init_config;
mod run;

pub use extract::execute_extract;
pub use init_config::execute_init_config;
pub use run::{execute_run, run_documents};

use crate::config::{AppConfig, LlmConfig};
use crate::error::{CliError, Result};
use grantex_domain::LlmProvider;
use grantex_extractor::ExtractionEngine;
use grantex_llm::OpenAiProvider;
use grantex_pipeline::ExtractionOrchestrator;
use grantex_validator::RecordValidator;
use std::time::Duration;

/// Build the OpenAI provider from configuration.
pub fn openai_provider(config: &LlmConfig) -> Result<OpenAiProvider> {
    if config.api_key.trim().is_empty() {
        return Err(CliError::Config(
            "missing API key: set OPENAI_API_KEY or llm.api_key".into(),
        ));
    }

    let mut provider = OpenAiProvider::with_timeout(
        config.api_key.clone(),
        config.model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens);

    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(provider)
}

/// Wire engine, validator and orchestrator for `provider`.
pub fn build_orchestrator<L>(
    provider: L,
    config: &AppConfig,
) -> Result<ExtractionOrchestrator<L>>
where
    L: LlmProvider + 'static,
{
    let schema = config.schema()?;
    let engine = ExtractionEngine::new(provider, schema.clone(), config.engine_config());
    let validator = RecordValidator::new(schema, config.validation.clone())?;
    Ok(ExtractionOrchestrator::new(engine, validator, config.pipeline_config())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_requires_key() {
        let config = LlmConfig::default();
        assert!(matches!(openai_provider(&config), Err(CliError::Config(_))));
    }

    #[test]
    fn test_openai_provider_with_key() {
        let config = LlmConfig {
            api_key: "sk-test".into(),
            base_url: Some("http://localhost:9999/v1".into()),
            ..Default::default()
        };
        let provider = openai_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-3.5-turbo");
    }
}
