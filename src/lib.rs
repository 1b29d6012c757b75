//! # doc-insights
//!
//! Turn a PDF or plain-text document into a structured Markdown report
//! (summary, keywords, questions) with one call to a hosted LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Input    classify by extension (pdf / txt)
//!  ├─ 2. Extract  pdfium page text (spawn_blocking) or UTF-8 decode
//!  ├─ 3. Compose  truncate to 10 000 chars, fill {document} / {summary_type}
//!  ├─ 4. Infer    one text-generation request, max_new_tokens=1024, temperature=0.5
//!  └─ 5. Polish   strip fences and end tokens, normalise whitespace
//! ```
//!
//! The [`session`] state machine drives these stages for one user, and the
//! [`web`] module serves it as a small browser UI.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc_insights::{InsightsConfig, SummaryStyle, Workflow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InsightsConfig::builder()
//!         .api_token(std::env::var("HUGGINGFACEHUB_API_TOKEN")?)
//!         .build()?;
//!     let workflow = Workflow::from_config(config)?;
//!
//!     let bytes = std::fs::read("notes.txt")?;
//!     let output = workflow.run("notes.txt", bytes, SummaryStyle::Brief).await?;
//!     println!("{}", output.report.markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc-insights` binary (clap + anyhow + dotenvy + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod web;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{InsightsConfig, InsightsConfigBuilder, SummaryStyle};
pub use error::{ExtractionError, InferenceError, InsightsError, SessionError, TemplateError};
pub use pipeline::compose::ComposedPrompt;
pub use pipeline::llm::{GeneratedReport, GenerationParams, TextGenerator};
pub use prompts::PromptTemplate;
pub use session::{Notice, NoticeLevel, Session, SessionState};
pub use workflow::{RunError, RunOutput, Workflow};
