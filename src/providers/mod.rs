//! Inference backends.
//!
//! [`resolve_generator`] picks one at start-up:
//!
//! 1. `provider_name` set: an edgequake-llm provider ([`edgequake`])
//! 2. otherwise: the Hugging Face Inference API ([`huggingface`]), which
//!    requires the bearer token

pub mod edgequake;
pub mod huggingface;

use crate::config::{InsightsConfig, TOKEN_ENV_VAR};
use crate::error::InsightsError;
use crate::pipeline::llm::TextGenerator;
use std::sync::Arc;
use tracing::info;

pub use edgequake::LlmProviderGenerator;
pub use huggingface::HuggingFaceClient;

/// Build the generator described by `config`.
pub fn resolve_generator(config: &InsightsConfig) -> Result<Arc<dyn TextGenerator>, InsightsError> {
    if let Some(ref name) = config.provider_name {
        info!("Using LLM provider '{}' with model '{}'", name, config.model);
        let generator = LlmProviderGenerator::from_name(name, &config.model)?;
        return Ok(Arc::new(generator));
    }

    let token = config
        .api_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| InsightsError::MissingCredential {
            var: TOKEN_ENV_VAR.to_string(),
        })?;

    let client = HuggingFaceClient::new(&config.api_base, &config.model, token)?;
    info!("Using Hugging Face model '{}' at {}", config.model, client.endpoint());
    Ok(Arc::new(client))
}
