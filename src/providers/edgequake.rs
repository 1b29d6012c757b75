//! Adapter exposing an edgequake-llm chat provider as a [`TextGenerator`].
//!
//! Lets the same workflow run against OpenAI, Anthropic, Ollama and the other
//! backends edgequake-llm knows about. The composed prompt is sent as a single
//! user message.

use crate::error::{InferenceError, InsightsError};
use crate::pipeline::llm::{GenerationParams, TextGenerator};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

pub struct LlmProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl LlmProviderGenerator {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Create a provider by name via [`ProviderFactory`]. The provider reads
    /// its own credential (`OPENAI_API_KEY`, ...) from the environment.
    pub fn from_name(provider_name: &str, model: &str) -> Result<Self, InsightsError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            InsightsError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider, model))
    }
}

fn build_options(params: &GenerationParams) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(params.temperature),
        max_tokens: Some(params.max_new_tokens),
        ..Default::default()
    }
}

#[async_trait]
impl TextGenerator for LlmProviderGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let messages = vec![ChatMessage::user(prompt)];
        let options = build_options(params);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| InferenceError::Provider(format!("{e}")))?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}
