//! Inference adapter: one composed prompt in, one report out.
//!
//! The backend sits behind [`TextGenerator`] so the workflow never knows
//! whether it is talking to the HF Inference API, an edgequake-llm provider,
//! or a test double. The generator is built once at start-up and shared
//! read-only.
//!
//! ## Call contract
//!
//! Exactly one request per click with fixed generation parameters. No retry,
//! no backoff, no streaming, no timeout beyond the transport's own. Failure
//! is an [`InferenceError`] value; the caller branches on the `Result`, never
//! on the text.

use crate::config::InsightsConfig;
use crate::error::InferenceError;
use crate::pipeline::compose::ComposedPrompt;
use crate::pipeline::postprocess;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 1024,
            temperature: 0.5,
        }
    }
}

impl From<&InsightsConfig> for GenerationParams {
    fn from(config: &InsightsConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        }
    }
}

/// A remote text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs and the report footer.
    fn model(&self) -> &str;

    /// Issue a single generation request.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}

/// Successful model output.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    /// Cleaned Markdown.
    pub markdown: String,
    pub model: String,
    pub duration_ms: u64,
}

/// Send a composed prompt to the generator and clean the result.
pub async fn generate_report(
    generator: &Arc<dyn TextGenerator>,
    prompt: &ComposedPrompt,
    params: &GenerationParams,
) -> Result<GeneratedReport, InferenceError> {
    let start = Instant::now();
    info!(
        "Requesting {} report from '{}' ({} prompt chars)",
        prompt.style,
        generator.model(),
        prompt.prompt.chars().count()
    );

    match generator.generate(&prompt.prompt, params).await {
        Ok(raw) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            debug!("Generated {} chars in {}ms", raw.len(), duration_ms);
            Ok(GeneratedReport {
                markdown: postprocess::clean_report(&raw),
                model: generator.model().to_string(),
                duration_ms,
            })
        }
        Err(e) => {
            warn!("Generation failed after {}ms: {}", start.elapsed().as_millis(), e);
            Err(e)
        }
    }
}
