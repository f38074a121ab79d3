//! Description decoder. Turns a description of unknown shape into a [`DescriptionValue`].
//!
//! The backend emits descriptions as plain prose, JSON arrays, JSON arrays encoded
//! inside a string, Python-style single-quoted lists, half-broken lists, and
//! placeholder text standing in for failed generations. Decoding runs an ordered
//! chain of strategies and takes the first that succeeds:
//!
//! 1. absent / null / empty → `Empty`
//! 2. array → bullets with blank entries dropped
//! 3. exact sentinel text → `Empty`
//! 4. advisory phrase → `Note`
//! 5. text starting with `[`:
//!    strict JSON → single-quote-repaired JSON → manual split
//! 6. anything else → `Paragraph`
//!
//! No strategy panics or returns an error. A failed strategy yields `None` and the
//! chain moves on.

use serde_json::Value;
use tracing::debug;

use crate::models::DescriptionValue;
use crate::normalize::coercion::coerce_optional;

/// Whole-value placeholders meaning "nothing to show".
const SENTINELS: &[&str] = &[
    "[]",
    "[",
    "]",
    "Failed to parse generated content. Please try again.",
    "Your content will appear here once generated. Please try again with your request.",
];

/// Lower-cased phrases marking backend advisory text.
const ADVISORY_PHRASES: &[&str] = &[
    "please provide",
    "content will appear",
    "failed to parse generated content",
];

type ListStrategy = fn(&str) -> Option<Vec<String>>;

/// Tried in order on text that starts with `[`. The manual split runs last and
/// always produces a list.
const LIST_STRATEGIES: &[(&str, ListStrategy)] = &[
    ("strict_json", parse_strict_json),
    ("single_quoted_json", parse_single_quoted_json),
];

/// Decodes a raw description value. Pure: same input, same output.
pub fn decode_description(raw: Option<&Value>) -> DescriptionValue {
    match raw {
        None | Some(Value::Null) => DescriptionValue::Empty,
        Some(Value::Array(items)) => classify(clean_items(items)),
        Some(Value::String(text)) => decode_text(text),
        Some(Value::Number(n)) => DescriptionValue::Paragraph(n.to_string()),
        Some(Value::Bool(b)) => DescriptionValue::Paragraph(b.to_string()),
        Some(Value::Object(_)) => {
            debug!("Description arrived as an object; treating as empty");
            DescriptionValue::Empty
        }
    }
}

/// Decodes a description that arrived as a string.
pub fn decode_text(raw: &str) -> DescriptionValue {
    let text = raw.trim();
    if text.is_empty() || is_sentinel(text) {
        return DescriptionValue::Empty;
    }
    if is_advisory(text) {
        return DescriptionValue::Note(text.to_string());
    }
    if text.starts_with('[') {
        return decode_bracketed(text);
    }
    DescriptionValue::Paragraph(text.to_string())
}

pub fn is_sentinel(text: &str) -> bool {
    let text = text.trim();
    SENTINELS.iter().any(|s| *s == text)
}

pub fn is_advisory(text: &str) -> bool {
    let lower = text.to_lowercase();
    ADVISORY_PHRASES.iter().any(|p| lower.contains(p))
}

fn decode_bracketed(text: &str) -> DescriptionValue {
    for (name, strategy) in LIST_STRATEGIES {
        if let Some(items) = strategy(text) {
            debug!(strategy = *name, items = items.len(), "Decoded bracketed description");
            return classify(items);
        }
    }
    let items = decompose_manually(text);
    debug!(strategy = "manual_split", items = items.len(), "Decoded bracketed description");
    classify(items)
}

/// Bullets when non-empty, otherwise `Empty`. Never yields `Bullets([])`.
fn classify(items: Vec<String>) -> DescriptionValue {
    if items.is_empty() {
        DescriptionValue::Empty
    } else {
        DescriptionValue::Bullets(items)
    }
}

/// Keeps trimmed, non-blank scalar entries. Nulls and nested containers are dropped.
fn clean_items(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(|item| coerce_optional(Some(item))).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// List strategies
// ────────────────────────────────────────────────────────────────────────────

fn parse_strict_json(text: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => Some(clean_items(&items)),
        _ => None,
    }
}

fn parse_single_quoted_json(text: &str) -> Option<Vec<String>> {
    parse_strict_json(&text.replace('\'', "\""))
}

/// Splits a list-looking string by hand. Prose that merely starts with `[`
/// becomes a one-item list.
fn decompose_manually(text: &str) -> Vec<String> {
    split_list_items(strip_outer_brackets(text))
        .into_iter()
        .map(clean_piece)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Splits on commas that open a new item: the next non-space character is a
/// quote, or nothing follows, or the remaining tail has no comma or quote.
fn split_list_items(body: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, ch) in body.char_indices() {
        if ch != ',' {
            continue;
        }
        let rest = body[idx + 1..].trim_start();
        let opens_item = rest.is_empty()
            || rest.starts_with(is_quote)
            || !rest.contains(|c: char| c == ',' || is_quote(c));
        if opens_item {
            pieces.push(&body[start..idx]);
            start = idx + 1;
        }
    }
    pieces.push(&body[start..]);
    pieces
}

/// Trims, strips one layer of surrounding quotes, unescapes escaped quotes.
fn clean_piece(piece: &str) -> String {
    let piece = piece.trim();
    let piece = piece.strip_prefix(is_quote).unwrap_or(piece);
    let piece = piece.strip_suffix(is_quote).unwrap_or(piece);
    piece
        .replace("\\\"", "\"")
        .replace("\\'", "'")
        .trim()
        .to_string()
}

/// Removes one leading `[` and one trailing `]`, each only if present.
fn strip_outer_brackets(text: &str) -> &str {
    let inner = text.strip_prefix('[').unwrap_or(text);
    inner.strip_suffix(']').unwrap_or(inner).trim()
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}
