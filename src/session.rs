//! Per-user session: the upload → preview → generate state machine.
//!
//! ```text
//! Idle ─upload─▶ Uploaded ─extract ok─▶ Previewed ─generate─▶ Generating ─▶ Reported
//!                   │                       ▲                       │
//!                   └─extract fail─▶ Halted  └── click again ────────┴──▶ Failed
//! ```
//!
//! Every action clears the previous notices and records new ones, the way a
//! page re-render replaces what was shown before. A new upload is accepted in
//! any state and restarts the flow.

use crate::config::SummaryStyle;
use crate::error::SessionError;
use crate::pipeline::compose::{truncate_chars, truncation_notice};
use crate::pipeline::llm::GeneratedReport;
use crate::workflow::Workflow;
use tracing::{info, warn};

/// Shown when extraction produced no text.
pub const EMPTY_TEXT_MESSAGE: &str = "Could not extract text from the document.";

/// Shown next to a rendered report.
pub const REPORT_SUCCESS_MESSAGE: &str = "Insights generated successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A document whose text has been extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Uploaded { file_name: String },
    Previewed(LoadedDocument),
    Generating(LoadedDocument),
    Reported {
        document: LoadedDocument,
        report: GeneratedReport,
    },
    Failed {
        document: LoadedDocument,
        error: String,
    },
    Halted { file_name: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Uploaded { .. } => "uploaded",
            SessionState::Previewed(_) => "previewed",
            SessionState::Generating(_) => "generating",
            SessionState::Reported { .. } => "reported",
            SessionState::Failed { .. } => "failed",
            SessionState::Halted { .. } => "halted",
        }
    }

    /// The extracted document, once there is one.
    pub fn document(&self) -> Option<&LoadedDocument> {
        match self {
            SessionState::Previewed(d) | SessionState::Generating(d) => Some(d),
            SessionState::Reported { document, .. } | SessionState::Failed { document, .. } => {
                Some(document)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    style: SummaryStyle,
    state: SessionState,
    notices: Vec<Notice>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SummaryStyle::default())
    }
}

impl Session {
    pub fn new(style: SummaryStyle) -> Self {
        Self {
            style,
            state: SessionState::Idle,
            notices: Vec::new(),
        }
    }

    /// Rebuild a session whose document was extracted by an earlier request.
    pub fn resume_previewed(
        style: SummaryStyle,
        file_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            style,
            state: SessionState::Previewed(LoadedDocument {
                file_name: file_name.into(),
                text: text.into(),
            }),
            notices: Vec::new(),
        }
    }

    pub fn style(&self) -> SummaryStyle {
        self.style
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// First `max_chars` characters of the extracted text.
    pub fn preview(&self, max_chars: usize) -> Option<&str> {
        self.state
            .document()
            .map(|d| truncate_chars(&d.text, max_chars).0)
    }

    /// Accept a new upload and extract its text.
    ///
    /// Ends in `Previewed` on success and `Halted` otherwise.
    pub async fn upload(&mut self, workflow: &Workflow, file_name: &str, bytes: Vec<u8>) {
        self.notices.clear();
        self.state = SessionState::Uploaded {
            file_name: file_name.to_string(),
        };
        self.notices.push(Notice::success(format!(
            "File '{file_name}' uploaded successfully!"
        )));

        match workflow.extract_upload(file_name, bytes).await {
            Ok(text) if text.is_empty() => {
                warn!("No text extracted from '{}'", file_name);
                self.halt(file_name, EMPTY_TEXT_MESSAGE.to_string());
            }
            Ok(text) => {
                self.state = SessionState::Previewed(LoadedDocument {
                    file_name: file_name.to_string(),
                    text,
                });
            }
            Err(e) => {
                warn!("Extraction failed for '{}': {}", file_name, e);
                self.halt(file_name, e.to_string());
            }
        }
    }

    fn halt(&mut self, file_name: &str, message: String) {
        self.notices.push(Notice::error(message));
        self.state = SessionState::Halted {
            file_name: file_name.to_string(),
        };
    }

    /// Compose the prompt and make the single inference call.
    ///
    /// Valid from `Previewed`, `Reported` and `Failed`. Ends in `Reported` or
    /// `Failed`; a template or inference fault is a notice, not an `Err`.
    pub async fn generate(&mut self, workflow: &Workflow) -> Result<(), SessionError> {
        let document = match &self.state {
            SessionState::Previewed(d) => d.clone(),
            SessionState::Reported { document, .. } | SessionState::Failed { document, .. } => {
                document.clone()
            }
            other => {
                return Err(SessionError {
                    from: other.name(),
                    action: "generate",
                })
            }
        };

        self.notices.clear();
        self.state = SessionState::Generating(document.clone());
        info!("Generating {} insights for '{}'", self.style, document.file_name);

        let prompt = match workflow.compose(&document.text, self.style) {
            Ok(p) => p,
            Err(e) => {
                self.fail(document, e.to_string());
                return Ok(());
            }
        };
        if prompt.truncated {
            self.notices
                .push(Notice::warning(truncation_notice(workflow.config().max_document_chars)));
        }

        match workflow.generate(&prompt).await {
            Ok(report) => {
                self.notices.push(Notice::success(REPORT_SUCCESS_MESSAGE));
                self.state = SessionState::Reported { document, report };
            }
            Err(e) => self.fail(document, e.to_string()),
        }
        Ok(())
    }

    fn fail(&mut self, document: LoadedDocument, error: String) {
        self.notices.push(Notice::error(error.clone()));
        self.state = SessionState::Failed { document, error };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightsConfig;
    use crate::error::InferenceError;
    use crate::pipeline::llm::{GenerationParams, TextGenerator};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(InferenceError::Service {
                    status: 503,
                    message: "Model is currently loading".into(),
                })
            } else {
                Ok("## Summary\nA greeting.".into())
            }
        }
    }

    fn setup(fail: bool, template: Option<&str>) -> (tempfile::TempDir, Workflow, Arc<Scripted>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt_logic.md");
        if let Some(t) = template {
            std::fs::write(&path, t).unwrap();
        }
        let config = InsightsConfig::builder()
            .api_token("hf_test")
            .template_path(path)
            .build()
            .unwrap();
        let gen = Arc::new(Scripted {
            calls: AtomicUsize::new(0),
            fail,
        });
        let wf = Workflow::new(config, gen.clone());
        (dir, wf, gen)
    }

    #[tokio::test]
    async fn upload_then_generate() {
        let (_dir, wf, gen) = setup(false, Some("{summary_type}: {document}"));
        let mut session = Session::default();

        session.upload(&wf, "hello.txt", b"Hello world".to_vec()).await;
        assert_eq!(session.state().name(), "previewed");
        assert_eq!(session.preview(500), Some("Hello world"));
        assert_eq!(
            session.notices(),
            &[Notice::success("File 'hello.txt' uploaded successfully!")]
        );

        session.generate(&wf).await.unwrap();
        assert_eq!(session.state().name(), "reported");
        assert_eq!(gen.calls.load(Ordering::SeqCst), 1);
        match session.state() {
            SessionState::Reported { report, .. } => {
                assert_eq!(report.markdown, "## Summary\nA greeting.\n")
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(session.notices(), &[Notice::success(REPORT_SUCCESS_MESSAGE)]);
    }

    #[tokio::test]
    async fn generate_before_upload_is_rejected() {
        let (_dir, wf, gen) = setup(false, Some("{document}"));
        let mut session = Session::default();
        let err = session.generate(&wf).await.unwrap_err();
        assert_eq!(err.from, "idle");
        assert_eq!(gen.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_upload_halts() {
        let (_dir, wf, gen) = setup(false, Some("{document}"));
        let mut session = Session::default();

        session.upload(&wf, "report.docx", b"PK\x03\x04".to_vec()).await;
        assert_eq!(session.state().name(), "halted");
        assert_eq!(session.notices().len(), 2);
        assert_eq!(session.notices()[1].level, NoticeLevel::Error);

        assert!(session.generate(&wf).await.is_err());
        assert_eq!(gen.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_text_halts() {
        let (_dir, wf, _) = setup(false, Some("{document}"));
        let mut session = Session::default();
        session.upload(&wf, "empty.txt", Vec::new()).await;
        assert_eq!(session.state().name(), "halted");
        assert_eq!(session.notices()[1], Notice::error(EMPTY_TEXT_MESSAGE));
    }

    #[tokio::test]
    async fn invalid_utf8_halts() {
        let (_dir, wf, _) = setup(false, Some("{document}"));
        let mut session = Session::default();
        session.upload(&wf, "bin.txt", vec![0xff, 0xfe, 0x00]).await;
        assert_eq!(session.state().name(), "halted");
    }

    #[tokio::test]
    async fn missing_template_fails_without_calling_model() {
        let (_dir, wf, gen) = setup(false, None);
        let mut session = Session::resume_previewed(SummaryStyle::Brief, "a.txt", "text");

        session.generate(&wf).await.unwrap();
        assert_eq!(session.state().name(), "failed");
        assert_eq!(gen.calls.load(Ordering::SeqCst), 0);
        assert!(session.notices()[0].message.contains("file not found"));
    }

    #[tokio::test]
    async fn inference_failure_then_retry_by_click() {
        let (_dir, wf, gen) = setup(true, Some("{document}"));
        let mut session = Session::resume_previewed(SummaryStyle::Executive, "a.txt", "text");

        session.generate(&wf).await.unwrap();
        assert_eq!(session.state().name(), "failed");
        assert_eq!(gen.calls.load(Ordering::SeqCst), 1);

        // A failed session accepts another click; each click is one call.
        session.generate(&wf).await.unwrap();
        assert_eq!(gen.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.notices().len(), 1);
    }

    #[tokio::test]
    async fn long_document_warns_about_truncation() {
        let (_dir, wf, _) = setup(false, Some("{document}"));
        let text = "a".repeat(12_000);
        let mut session = Session::resume_previewed(SummaryStyle::Brief, "long.txt", text);

        session.generate(&wf).await.unwrap();
        assert_eq!(
            session.notices()[0],
            Notice::warning(
                "Document text was truncated to the first 10000 characters for the prompt."
            )
        );
        assert_eq!(session.preview(500).map(str::len), Some(500));
    }
}
