//! Prompt template loading and substitution.
//!
//! The template lives in an external Markdown file (default
//! `prompt_logic.md`) so the prompt can be tuned without recompiling. It is
//! re-read on every composition, which means edits take effect on the next
//! click, and a missing file only degrades composition, never start-up.
//!
//! Substitution is literal `str::replace`, `{document}` first and
//! `{summary_type}` second. The template must not use either marker for any
//! other purpose.

use crate::config::SummaryStyle;
use crate::error::TemplateError;
use std::path::Path;
use tracing::debug;

/// Marker replaced by the (possibly truncated) document text.
pub const DOCUMENT_PLACEHOLDER: &str = "{document}";

/// Marker replaced by the summary style label.
pub const SUMMARY_TYPE_PLACEHOLDER: &str = "{summary_type}";

/// A prompt template read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    /// Wrap template text already in memory.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load the template from `path`.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        match std::fs::read_to_string(path) {
            Ok(source) => {
                debug!("Loaded template '{}' ({} bytes)", path.display(), source.len());
                Ok(Self { source })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TemplateError::Missing {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(TemplateError::Unreadable {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Raw template text, as shown in the template viewer.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Markers the template lacks. Empty for a well-formed template.
    pub fn missing_placeholders(&self) -> Vec<&'static str> {
        [DOCUMENT_PLACEHOLDER, SUMMARY_TYPE_PLACEHOLDER]
            .into_iter()
            .filter(|marker| !self.source.contains(marker))
            .collect()
    }

    /// Substitute both markers.
    pub fn render(&self, document: &str, style: SummaryStyle) -> String {
        self.source
            .replace(DOCUMENT_PLACEHOLDER, document)
            .replace(SUMMARY_TYPE_PLACEHOLDER, style.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_both_markers() {
        let t = PromptTemplate::new("Style: {summary_type}\n---\n{document}\n---\n{summary_type}");
        let out = t.render("Hello world", SummaryStyle::Executive);
        assert_eq!(out, "Style: Executive\n---\nHello world\n---\nExecutive");
        assert!(!out.contains(DOCUMENT_PLACEHOLDER));
        assert!(!out.contains(SUMMARY_TYPE_PLACEHOLDER));
    }

    #[test]
    fn document_is_substituted_before_style() {
        // A document that itself mentions `{summary_type}` gets that marker
        // replaced as well, because the style substitution runs second.
        let t = PromptTemplate::new("{document}");
        assert_eq!(t.render("see {summary_type}", SummaryStyle::Brief), "see Brief");
    }

    #[test]
    fn missing_placeholders_reported() {
        assert!(PromptTemplate::new("{document} {summary_type}")
            .missing_placeholders()
            .is_empty());
        assert_eq!(
            PromptTemplate::new("only {document}").missing_placeholders(),
            vec![SUMMARY_TYPE_PLACEHOLDER]
        );
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt_logic.md");
        assert!(matches!(
            PromptTemplate::load(&path),
            Err(TemplateError::Missing { .. })
        ));
    }

    #[test]
    fn load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt_logic.md");
        std::fs::write(&path, "Summarise ({summary_type}):\n{document}").unwrap();
        let t = PromptTemplate::load(&path).unwrap();
        assert_eq!(t.as_str(), "Summarise ({summary_type}):\n{document}");
    }
}
