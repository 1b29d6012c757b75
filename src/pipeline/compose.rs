//! Prompt composition: truncate the document and fill the template.
//!
//! Truncation counts characters, not bytes, so a multi-byte code point is
//! never split and the budget means the same thing for every script.

use crate::config::SummaryStyle;
use crate::error::TemplateError;
use crate::prompts::PromptTemplate;
use std::path::Path;
use tracing::{debug, warn};

/// The final prompt plus what happened to the document on the way in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub prompt: String,
    /// True when the document exceeded the character budget.
    pub truncated: bool,
    /// Character count of the extracted text.
    pub original_chars: usize,
    /// Character count actually substituted.
    pub used_chars: usize,
    pub style: SummaryStyle,
}

/// Keep the first `max_chars` characters. Returns the slice and whether
/// anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// User-facing notice shown when the document was cut.
pub fn truncation_notice(max_chars: usize) -> String {
    format!("Document text was truncated to the first {max_chars} characters for the prompt.")
}

/// Load the template at `template_path` and compose the prompt.
pub fn compose(
    text: &str,
    style: SummaryStyle,
    template_path: &Path,
    max_chars: usize,
) -> Result<ComposedPrompt, TemplateError> {
    let template = PromptTemplate::load(template_path)?;
    Ok(compose_with(&template, text, style, max_chars))
}

/// Compose against an already-loaded template.
pub fn compose_with(
    template: &PromptTemplate,
    text: &str,
    style: SummaryStyle,
    max_chars: usize,
) -> ComposedPrompt {
    let missing = template.missing_placeholders();
    if !missing.is_empty() {
        warn!("Prompt template lacks placeholder(s): {}", missing.join(", "));
    }

    let original_chars = text.chars().count();
    let (document, truncated) = truncate_chars(text, max_chars);
    let used_chars = if truncated { max_chars } else { original_chars };
    if truncated {
        warn!(
            "Document truncated from {} to {} characters",
            original_chars, max_chars
        );
    }

    let prompt = template.render(document, style);
    debug!("Composed {} prompt: {} chars", style, prompt.chars().count());

    ComposedPrompt {
        prompt,
        truncated,
        original_chars,
        used_chars,
        style,
    }
}
