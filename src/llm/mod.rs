//! LLM integration for HART.
//!
//! A single OpenAI-compatible backend behind the `LlmProvider` trait, plus the
//! `ChatResponder` that applies the open-chat system prompt and sampling
//! settings.

pub mod openai;
pub mod provider;
pub mod responder;

pub use openai::OpenAiProvider;
pub use provider::*;
pub use responder::ChatResponder;

use std::sync::Arc;

use crate::config::OpenAiConfig;

/// Create the completion provider from configuration.
pub fn create_provider(client: reqwest::Client, config: &OpenAiConfig) -> Arc<dyn LlmProvider> {
    tracing::info!("Using OpenAI (model: {})", config.model);
    Arc::new(OpenAiProvider::new(
        client,
        config.api_key.clone(),
        config.base_url.clone(),
        config.model.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_reports_configured_model() {
        let config = OpenAiConfig {
            api_key: secrecy::SecretString::from("sk-test"),
            model: "gpt-4o-mini".to_string(),
            base_url: crate::config::DEFAULT_OPENAI_BASE_URL.to_string(),
        };
        let provider = create_provider(reqwest::Client::new(), &config);
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }
}
