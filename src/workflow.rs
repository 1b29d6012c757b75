//! Process-lifetime bundle of configuration and inference backend.
//!
//! A [`Workflow`] is built once at start-up and shared read-only (behind an
//! `Arc`) by every request. It exposes one entry point per stage so the
//! session layer can drive the flow step by step:
//!
//! ```text
//! extract_upload ──▶ compose ──▶ generate
//! ```
//!
//! [`Workflow::run`] chains all three for one-shot use.

use crate::config::{InsightsConfig, SummaryStyle};
use crate::error::{ExtractionError, InferenceError, InsightsError, TemplateError};
use crate::pipeline::compose::{self, ComposedPrompt};
use crate::pipeline::llm::{self, GeneratedReport, GenerationParams, TextGenerator};
use crate::pipeline::{extract, input};
use crate::prompts::PromptTemplate;
use crate::providers;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Shared state for the extraction → composition → inference flow.
#[derive(Clone)]
pub struct Workflow {
    config: InsightsConfig,
    generator: Arc<dyn TextGenerator>,
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("config", &self.config)
            .field("generator", &self.generator.model())
            .finish()
    }
}

impl Workflow {
    /// Use an already-built generator.
    pub fn new(config: InsightsConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    /// Build the generator described by `config`. Errors here are fatal.
    pub fn from_config(config: InsightsConfig) -> Result<Self, InsightsError> {
        let generator = providers::resolve_generator(&config)?;
        Ok(Self::new(config, generator))
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Classify and extract an upload.
    pub async fn extract_upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ExtractionError> {
        let document = input::resolve_upload(file_name, bytes)?;
        extract::extract(&document).await
    }

    /// Compose the prompt, reading the template fresh from disk.
    pub fn compose(&self, text: &str, style: SummaryStyle) -> Result<ComposedPrompt, TemplateError> {
        compose::compose(
            text,
            style,
            &self.config.template_path,
            self.config.max_document_chars,
        )
    }

    /// The single generation call.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> Result<GeneratedReport, InferenceError> {
        let params = GenerationParams::from(&self.config);
        llm::generate_report(&self.generator, prompt, &params).await
    }

    /// Read the template for display.
    pub fn read_template(&self) -> Result<PromptTemplate, TemplateError> {
        PromptTemplate::load(&self.config.template_path)
    }

    /// Run every stage for one document. Used by the one-shot CLI.
    pub async fn run(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        style: SummaryStyle,
    ) -> Result<RunOutput, RunError> {
        let start = Instant::now();
        info!("Processing '{}' ({} style)", file_name, style);

        let text = self.extract_upload(file_name, bytes).await?;
        if text.is_empty() {
            return Err(RunError::EmptyText);
        }

        let prompt = self.compose(&text, style)?;
        let report = self.generate(&prompt).await?;

        debug!("Run finished in {}ms", start.elapsed().as_millis());
        Ok(RunOutput {
            truncated: prompt.truncated,
            report,
        })
    }
}

/// Result of [`Workflow::run`].
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: GeneratedReport,
    pub truncated: bool,
}

/// Any non-fatal failure of a one-shot run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Could not extract text from the document.")]
    EmptyText,

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for Echo {
        fn model(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("## Summary\n{prompt}"))
        }
    }

    fn workflow(dir: &tempfile::TempDir) -> (Workflow, Arc<Echo>) {
        let template = dir.path().join("prompt_logic.md");
        std::fs::write(&template, "[{summary_type}] {document}").unwrap();
        let config = InsightsConfig::builder()
            .api_token("hf_test")
            .template_path(template)
            .build()
            .unwrap();
        let echo = Arc::new(Echo {
            calls: AtomicUsize::new(0),
        });
        (Workflow::new(config, echo.clone()), echo)
    }

    #[tokio::test]
    async fn run_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let (wf, echo) = workflow(&dir);

        let out = wf
            .run("notes.txt", b"Hello world".to_vec(), SummaryStyle::Brief)
            .await
            .unwrap();

        assert_eq!(out.report.markdown, "## Summary\n[Brief] Hello world\n");
        assert!(!out.truncated);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_empty_text_stops_before_inference() {
        let dir = tempfile::tempdir().unwrap();
        let (wf, echo) = workflow(&dir);

        let err = wf
            .run("empty.txt", Vec::new(), SummaryStyle::Brief)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::EmptyText));
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let (wf, _) = workflow(&dir);

        let err = wf
            .run("report.docx", b"PK".to_vec(), SummaryStyle::Brief)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::Extraction(ExtractionError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn debug_hides_token() {
        let dir = tempfile::tempdir().unwrap();
        let (wf, _) = workflow(&dir);
        let dbg = format!("{wf:?}");
        assert!(!dbg.contains("hf_test"));
        assert!(dbg.contains("echo"));
    }
}
