//! Configuration types for document insight generation.
//!
//! All behaviour is controlled through [`InsightsConfig`], built via its
//! [`InsightsConfigBuilder`]. The config is constructed once at start-up and
//! shared read-only by every request.

use crate::error::InsightsError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable holding the Hugging Face bearer token.
pub const TOKEN_ENV_VAR: &str = "HUGGINGFACEHUB_API_TOKEN";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";

/// Base URL of the hosted text-generation endpoint; the model id is appended.
pub const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference/models";

/// Template file looked up relative to the working directory.
pub const DEFAULT_TEMPLATE_PATH: &str = "prompt_logic.md";

/// Configuration for the extraction → composition → inference flow.
///
/// # Example
/// ```rust
/// use doc_insights::InsightsConfig;
///
/// let config = InsightsConfig::builder()
///     .api_token("hf_xxx")
///     .model("HuggingFaceH4/zephyr-7b-beta")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_new_tokens, 1024);
/// ```
#[derive(Clone)]
pub struct InsightsConfig {
    /// Model identifier, e.g. "mistralai/Mixtral-8x7B-Instruct-v0.1".
    pub model: String,

    /// Bearer credential for the HF Inference API. Required unless
    /// `provider_name` selects another backend.
    pub api_token: Option<String>,

    /// Base URL for the HF backend. Default: [`DEFAULT_API_BASE`].
    pub api_base: String,

    /// edgequake-llm provider name (e.g. "openai", "ollama"). If None, the HF
    /// Inference API is used.
    pub provider_name: Option<String>,

    /// Maximum tokens the model may generate. Default: 1024.
    pub max_new_tokens: usize,

    /// Sampling temperature. Default: 0.5.
    pub temperature: f32,

    /// Document characters kept before substitution. Default: 10 000.
    ///
    /// 10 000 characters is roughly 2 500–3 000 tokens, well inside the
    /// context window of the default model.
    pub max_document_chars: usize,

    /// Characters of extracted text shown in the preview. Default: 500.
    pub preview_chars: usize,

    /// Path of the prompt template. Default: `prompt_logic.md`.
    pub template_path: PathBuf,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            provider_name: None,
            max_new_tokens: 1024,
            temperature: 0.5,
            max_document_chars: 10_000,
            preview_chars: 500,
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
        }
    }
}

impl fmt::Debug for InsightsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightsConfig")
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("provider_name", &self.provider_name)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("temperature", &self.temperature)
            .field("max_document_chars", &self.max_document_chars)
            .field("preview_chars", &self.preview_chars)
            .field("template_path", &self.template_path)
            .finish()
    }
}

impl InsightsConfig {
    /// Create a new builder for `InsightsConfig`.
    pub fn builder() -> InsightsConfigBuilder {
        InsightsConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when the default Hugging Face backend is selected.
    pub fn uses_huggingface(&self) -> bool {
        self.provider_name.is_none()
    }
}

/// Builder for [`InsightsConfig`].
#[derive(Debug)]
pub struct InsightsConfigBuilder {
    config: InsightsConfig,
}

impl InsightsConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    /// Set the token from an optional value, e.g. an env lookup.
    pub fn api_token_opt(mut self, token: Option<String>) -> Self {
        self.config.api_token = token;
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn max_new_tokens(mut self, n: usize) -> Self {
        self.config.max_new_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_document_chars(mut self, n: usize) -> Self {
        self.config.max_document_chars = n;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.config.preview_chars = n;
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = path.into();
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing or blank credential is fatal for the HF backend.
    pub fn build(self) -> Result<InsightsConfig, InsightsError> {
        let c = &self.config;
        if c.uses_huggingface() {
            let blank = c.api_token.as_deref().map_or(true, |t| t.trim().is_empty());
            if blank {
                return Err(InsightsError::MissingCredential {
                    var: TOKEN_ENV_VAR.to_string(),
                });
            }
        }
        if c.model.trim().is_empty() {
            return Err(InsightsError::InvalidConfig("Model id must not be empty".into()));
        }
        if c.max_document_chars == 0 {
            return Err(InsightsError::InvalidConfig(
                "max_document_chars must be ≥ 1".into(),
            ));
        }
        if c.max_new_tokens == 0 {
            return Err(InsightsError::InvalidConfig("max_new_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Report framing requested from the model, substituted for `{summary_type}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SummaryStyle {
    #[default]
    Brief,
    Detailed,
    Executive,
}

impl SummaryStyle {
    /// All styles in selector order.
    pub const ALL: [SummaryStyle; 3] = [
        SummaryStyle::Brief,
        SummaryStyle::Detailed,
        SummaryStyle::Executive,
    ];

    /// Label shown in the UI and inserted into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            SummaryStyle::Brief => "Brief",
            SummaryStyle::Detailed => "Detailed",
            SummaryStyle::Executive => "Executive",
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SummaryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brief" => Ok(SummaryStyle::Brief),
            "detailed" => Ok(SummaryStyle::Detailed),
            "executive" => Ok(SummaryStyle::Executive),
            other => Err(format!(
                "Unknown summary style '{other}' (expected brief, detailed or executive)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generation_contract() {
        let c = InsightsConfig::builder().api_token("hf_test").build().unwrap();
        assert_eq!(c.max_new_tokens, 1024);
        assert_eq!(c.temperature, 0.5);
        assert_eq!(c.max_document_chars, 10_000);
        assert_eq!(c.preview_chars, 500);
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.template_path, PathBuf::from("prompt_logic.md"));
    }

    #[test]
    fn missing_token_is_fatal_for_hf_backend() {
        let err = InsightsConfig::builder().build().unwrap_err();
        assert!(matches!(err, InsightsError::MissingCredential { .. }));

        let err = InsightsConfig::builder().api_token("   ").build().unwrap_err();
        assert!(matches!(err, InsightsError::MissingCredential { .. }));
    }

    #[test]
    fn named_provider_does_not_need_hf_token() {
        let c = InsightsConfig::builder()
            .provider_name("ollama")
            .model("llama3.2")
            .build()
            .unwrap();
        assert!(!c.uses_huggingface());
    }

    #[test]
    fn debug_redacts_token() {
        let c = InsightsConfig::builder().api_token("hf_secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hf_secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn style_parse_is_case_insensitive() {
        assert_eq!("BRIEF".parse::<SummaryStyle>(), Ok(SummaryStyle::Brief));
        assert_eq!(" detailed ".parse::<SummaryStyle>(), Ok(SummaryStyle::Detailed));
        assert_eq!("Executive".parse::<SummaryStyle>(), Ok(SummaryStyle::Executive));
        assert!("verbose".parse::<SummaryStyle>().is_err());
    }

    #[test]
    fn style_labels_round_trip() {
        for style in SummaryStyle::ALL {
            assert_eq!(style.label().parse::<SummaryStyle>(), Ok(style));
        }
    }
}
