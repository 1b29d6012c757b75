//! Post-processing: deterministic cleanup of model-generated reports.
//!
//! Raw text-generation output is usually good Markdown, but hosted
//! instruction models leave small artefacts: an outer ```` ```markdown ````
//! fence, a trailing `</s>` end-of-sequence token, CRLF line endings, runs of
//! blank lines. The rules below are pure `&str → String` passes applied in a
//! fixed order.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every cleanup rule to a raw model response.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip special end-of-sequence tokens left in the text
/// 3. Strip an outer markdown fence wrapping the whole report
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 2
/// 6. Ensure heading lines have a blank line before them
/// 7. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 8. Ensure the report ends with exactly one newline
pub fn clean_report(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_special_tokens(&s);
    let s = strip_markdown_fences(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = normalise_heading_spacing(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(s.trim_start_matches('\n'))
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip end-of-sequence tokens ─────────────────────────────────────

static RE_SPECIAL_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</s>|<\|(?:endoftext|im_end|eot_id|end)\|>").unwrap()
});

fn strip_special_tokens(input: &str) -> String {
    RE_SPECIAL_TOKENS.replace_all(input, "").to_string()
}

// ── Rule 3: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?\n(.*)\n```$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 6: Normalise heading spacing ────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6} ").unwrap());

fn normalise_heading_spacing(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 64);
    let mut in_code = false;
    for (i, line) in input.lines().enumerate() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
        }
        if !in_code && i > 0 && RE_HEADING.is_match(line) {
            let trimmed = result.trim_end_matches('\n').len();
            result.truncate(trimmed);
            result.push_str("\n\n");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

// ── Rule 7: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}'],
        "",
    )
}

// ── Rule 8: Ensure report ends with single newline ──────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
