//! Resilient extraction of structured values from free-form model text.
//!
//! Models asked for JSON reply with label prefixes, code fences, trailing
//! commas, truncated tails, or Python-style single quotes. The pipeline here
//! tries a strict parse first and then a bounded set of repairs; each stage is
//! a named pure function and every failure degrades to an empty collection.
//! Nothing in this module returns an error or panics on any input.
//!
//! Stage order, applied by [`plan_steps`] and [`string_list`]:
//! 1. [`strip_label_prefix`], 2. [`strip_code_fence`], 3. strict JSON parse,
//! 4. [`remove_trailing_commas`] + [`truncate_to_last_bracket`] guarded by
//! [`has_balanced_quotes`], 5. permissive literal parse via
//! [`normalize_literal`]. Shape validation treats a mismatch as failure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::agent::plan::PlanStep;

/// Label prefixes models sometimes echo before the payload.
const LABEL_PREFIXES: &[&str] = &["query_plan: ", "related_questions: "];

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[\]\}])").expect("trailing-comma regex"));

/// Drops a known label prefix when present.
pub fn strip_label_prefix(text: &str) -> &str {
    for prefix in LABEL_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            return rest;
        }
    }
    text
}

/// Removes a single leading/trailing fenced code block marker, regardless of
/// the declared language tag. Text without fences passes through unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let body = match trimmed.strip_prefix("```") {
        Some(rest) => match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => rest
                .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
                .trim_start(),
        },
        None => trimmed,
    };
    let body = body.trim_end();
    match body.strip_suffix("```") {
        Some(rest) => rest.trim_end(),
        None => body,
    }
}

/// Removes a comma that sits immediately before a closing `]` or `}`.
pub fn remove_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Truncates at the last closing `]`, discarding an incomplete trailing
/// element. Text without a `]` is returned unchanged.
pub fn truncate_to_last_bracket(text: &str) -> &str {
    match text.rfind(']') {
        Some(i) => &text[..=i],
        None => text,
    }
}

/// True when the count of unescaped double quotes is even. An odd count almost
/// always means truncated or corrupted output, so repair is abandoned.
pub fn has_balanced_quotes(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut count = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
            count += 1;
        }
    }
    count % 2 == 0
}

/// Rewrites Python-literal-style text into JSON: single-quoted strings become
/// double-quoted, double quotes inside them are escaped, and `\'` unescapes.
/// Content outside strings is copied unchanged.
pub fn normalize_literal(text: &str) -> String {
    enum In {
        None,
        Single,
        Double,
    }
    let mut out = String::with_capacity(text.len() + 8);
    let mut state = In::None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            In::None => match c {
                '\'' => {
                    state = In::Single;
                    out.push('"');
                }
                '"' => {
                    state = In::Double;
                    out.push('"');
                }
                _ => out.push(c),
            },
            In::Single => match c {
                '\\' => {
                    if let Some(&next) = chars.peek() {
                        chars.next();
                        if next == '\'' {
                            out.push('\'');
                        } else {
                            out.push('\\');
                            out.push(next);
                        }
                    }
                }
                '\'' => {
                    state = In::None;
                    out.push('"');
                }
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            },
            In::Double => match c {
                '\\' => {
                    out.push('\\');
                    if let Some(&next) = chars.peek() {
                        chars.next();
                        out.push(next);
                    }
                }
                '"' => {
                    state = In::None;
                    out.push('"');
                }
                _ => out.push(c),
            },
        }
    }
    out
}

/// Permissive parse of the repaired text: normalize quoting, then JSON parse.
fn parse_literal(text: &str) -> Option<Value> {
    serde_json::from_str(&normalize_literal(text)).ok()
}

/// Runs the full pipeline and returns the first value any stage yields.
fn extract_value(raw: &str) -> Option<Value> {
    let text = strip_code_fence(strip_label_prefix(raw.trim())).trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let repaired = remove_trailing_commas(text);
    let repaired = truncate_to_last_bracket(&repaired);
    if !has_balanced_quotes(repaired) {
        return None;
    }
    parse_literal(repaired)
}

/// Parses raw model text into plan steps. Shape: a list of objects with
/// integer `id`, string `step`, and (optional) list-of-integer
/// `dependencies`. Any parse or shape failure yields an empty list.
pub fn plan_steps(raw: &str) -> Vec<PlanStep> {
    let Some(value) = extract_value(raw) else {
        return Vec::new();
    };
    serde_json::from_value(value).unwrap_or_default()
}

/// Parses raw model text into a list of strings. A list with any non-string
/// element is a shape mismatch and yields an empty list.
pub fn string_list(raw: &str) -> Vec<String> {
    let Some(Value::Array(items)) = extract_value(raw) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => out.push(s),
            _ => return Vec::new(),
        }
    }
    out
}
