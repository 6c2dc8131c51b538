//! Response parser — turns semi-structured model text into a next action.
//!
//! The reasoning and synthesis prompts ask for three labeled sections:
//! `**Thought:**` (or `**Evaluation:**`), `**Action:**`, and
//! `**Action Parameters:**`. Models do not always comply, so the parser is
//! total: anything unparseable falls back to `final_answer` with empty
//! parameters, which guarantees the loop always has a valid next action.

use reagent_core::tool::ToolParams;
use tracing::debug;

/// The action name that terminates the loop.
pub const FINAL_ANSWER: &str = "final_answer";

/// Maximum characters of raw text kept as the leading field on fallback.
const FALLBACK_PREFIX_CHARS: usize = 200;

/// The stable output of parsing one model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Thought or evaluation text
    pub leading: String,
    /// A tool name or `final_answer`
    pub action: String,
    pub params: ToolParams,
}

/// Parse a raw model response into (leading, action, params).
pub fn parse_response(raw: &str) -> ParsedResponse {
    let sections = split_sections(raw);

    let leading = sections
        .iter()
        .find(|(label, _)| *label == Label::Leading)
        .map(|(_, body)| body.trim().to_string());

    let action = sections
        .iter()
        .find(|(label, _)| *label == Label::Action)
        .and_then(|(_, body)| body.lines().map(str::trim).find(|l| !l.is_empty()))
        .map(|line| line.trim_matches(['*', '`', '\'', '"']).to_lowercase());

    let Some(action) = action.filter(|a| !a.is_empty()) else {
        // Malformed output: no action section. Keep a prefix of the raw
        // text as the thought and force termination.
        debug!("Unstructured model response, falling back to final_answer");
        return ParsedResponse {
            leading: truncate_chars(raw.trim(), FALLBACK_PREFIX_CHARS),
            action: FINAL_ANSWER.to_string(),
            params: ToolParams::new(),
        };
    };

    let params = sections
        .iter()
        .find(|(label, _)| *label == Label::Params)
        .map(|(_, body)| parse_params(body))
        .unwrap_or_default();

    ParsedResponse {
        leading: leading.unwrap_or_default(),
        action,
        params,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Leading,
    Action,
    Params,
}

/// Recognize a section label at the start of a line, case-insensitive,
/// tolerant of surrounding whitespace. Returns the label and the rest of
/// the line after it.
fn match_label(line: &str) -> Option<(Label, &str)> {
    let trimmed = line.trim_start();
    let lower = trimmed.to_lowercase();

    // Longest label first so "action parameters" is not read as "action".
    for (needle, label) in [
        ("**action parameters:**", Label::Params),
        ("**evaluation:**", Label::Leading),
        ("**thought:**", Label::Leading),
        ("**action:**", Label::Action),
    ] {
        if lower.starts_with(needle) {
            return Some((label, &trimmed[needle.len()..]));
        }
    }
    None
}

/// Split raw text into labeled sections, each running until the next label
/// or end of text.
fn split_sections(raw: &str) -> Vec<(Label, String)> {
    let mut sections: Vec<(Label, String)> = Vec::new();
    let mut current: Option<(Label, String)> = None;

    for line in raw.lines() {
        if let Some((label, rest)) = match_label(line) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some((label, rest.to_string()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push('\n');
            body.push_str(line);
        }
    }

    if let Some(done) = current {
        sections.push(done);
    }

    sections
}

/// Parse `key=value` lines into a parameter map, stripping surrounding
/// quotes from values.
fn parse_params(body: &str) -> ToolParams {
    let mut params = ToolParams::new();
    for line in body.lines() {
        let line = line.trim().trim_start_matches('-').trim_start();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            continue;
        }
        let value = value.trim().trim_matches(['"', '\'', '`']);
        params.insert(key.to_string(), value.to_string());
    }
    params
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
