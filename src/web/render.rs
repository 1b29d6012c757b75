//! Server-side HTML rendering.
//!
//! The page shell is a static template with `{{ name }}` slots filled by
//! literal replacement. Every piece of user or model text passes through
//! [`escape_html`], and Markdown is rendered with raw HTML events demoted to
//! text so a model cannot inject markup.

use crate::config::SummaryStyle;
use crate::error::TemplateError;
use crate::prompts::PromptTemplate;
use crate::session::{Notice, Session, SessionState};
use axum::response::Html;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pulldown_cmark::{html, Event, Options, Parser};
use std::fmt::Write as _;

const PAGE_HTML: &str = include_str!("../../templates/page.html");

/// What the template viewer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePanel {
    Shown(String),
    Unavailable(String),
}

impl TemplatePanel {
    pub fn from_load(result: Result<PromptTemplate, TemplateError>) -> Self {
        match result {
            Ok(t) => TemplatePanel::Shown(t.as_str().to_string()),
            Err(TemplateError::Missing { path }) => TemplatePanel::Unavailable(format!(
                "{} not found, so cannot display prompt logic.",
                path.display()
            )),
            Err(e) => TemplatePanel::Unavailable(e.to_string()),
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render model Markdown to HTML, escaping any embedded raw HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

fn style_options(selected: SummaryStyle) -> String {
    let mut out = String::new();
    for style in SummaryStyle::ALL {
        let _ = write!(
            out,
            r#"<option value="{0}"{1}>{0}</option>"#,
            style.label(),
            if style == selected { " selected" } else { "" }
        );
    }
    out
}

fn notices_html(notices: &[Notice]) -> String {
    let mut out = String::new();
    for notice in notices {
        let _ = writeln!(
            out,
            r#"<div class="notice notice-{}">{}</div>"#,
            notice.level.as_str(),
            escape_html(&notice.message)
        );
    }
    out
}

fn template_viewer(panel: &TemplatePanel) -> String {
    match panel {
        TemplatePanel::Shown(source) => format!(
            "<details><summary>View Raw Prompt Engineering Logic (Template)</summary>\n\
             <p>This is the template used. <code>{{document}}</code> and \
             <code>{{summary_type}}</code> are replaced at runtime.</p>\n\
             <pre><code class=\"language-markdown\">{}</code></pre></details>",
            escape_html(source)
        ),
        TemplatePanel::Unavailable(message) => {
            format!(r#"<div class="notice notice-warning">{}</div>"#, escape_html(message))
        }
    }
}

/// Hidden-field form of the document text. Browsers rewrite every newline in
/// a submitted form value as CRLF; base64 has no newlines to rewrite.
pub fn encode_carried_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Inverse of [`encode_carried_text`].
pub fn decode_carried_text(encoded: &str) -> Result<String, String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("Malformed document field: {e}"))?;
    String::from_utf8(bytes).map_err(|_| "Document field is not valid UTF-8".to_string())
}

/// Preview plus the form that posts the document back for generation.
fn preview_section(session: &Session, preview_chars: usize) -> String {
    let Some(document) = session.state().document() else {
        return String::new();
    };
    let preview = session.preview(preview_chars).unwrap_or_default();
    let style = session.style();

    format!(
        "<h2>📄 Document Preview (First {preview_chars} characters)</h2>\n\
         <textarea readonly>{preview}...</textarea>\n\
         <form action=\"/generate\" method=\"post\" onsubmit=\"markBusy(this)\">\n\
         <input type=\"hidden\" name=\"file_name\" value=\"{file_name}\">\n\
         <input type=\"hidden\" name=\"encoded_text\" value=\"{encoded}\">\n\
         <select name=\"style\">{options}</select>\n\
         <button type=\"submit\">🔍 Generate {style} Insights</button>\n\
         <span class=\"busy\" hidden>Generating {style} summary... Please wait.</span>\n\
         </form>",
        preview = escape_html(preview),
        file_name = escape_html(&document.file_name),
        encoded = encode_carried_text(&document.text),
        options = style_options(style),
    )
}

fn report_section(state: &SessionState) -> String {
    match state {
        SessionState::Reported { report, .. } => format!(
            "<h2>📊 Structured Report</h2>\n<div class=\"report\">\n{}</div>\n\
             <p><small>Model: {} ({} ms)</small></p>",
            markdown_to_html(&report.markdown),
            escape_html(&report.model),
            report.duration_ms
        ),
        SessionState::Failed { .. } => "<h2>📊 Structured Report</h2>".to_string(),
        _ => String::new(),
    }
}

/// Render the full page for a session.
pub fn render_page(session: &Session, panel: &TemplatePanel, preview_chars: usize) -> Html<String> {
    let mut content = preview_section(session, preview_chars);
    content.push('\n');
    content.push_str(&report_section(session.state()));

    Html(fill_slots(
        PAGE_HTML,
        &[
            ("style_options", style_options(session.style())),
            ("notices", notices_html(session.notices())),
            ("content", content),
            ("template_viewer", template_viewer(panel)),
        ],
    ))
}

/// Replace each `{{ name }}` slot in one pass, so substituted text is never
/// scanned for further slots.
fn fill_slots(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{ ") {
        out.push_str(&rest[..start]);
        let slot = &rest[start..];
        let Some(end) = slot.find(" }}") else {
            out.push_str(slot);
            return out;
        };
        let name = &slot[3..end];
        match slots.iter().find(|(n, _)| *n == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&slot[..end + 3]),
        }
        rest = &slot[end + 3..];
    }
    out.push_str(rest);
    out
}
