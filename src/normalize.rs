//! Cleanup of free-form model output into a short answer.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::RelationType;

/// Answers longer than this many whitespace-separated tokens are rejected.
pub const MAX_ANSWER_TOKENS: usize = 3;

static STRIP_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[:؛،"“”]"#).expect("valid regex"));
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Reduces raw generated text to its first line, stripped of quotes,
/// separators and parenthetical notes.
///
/// Returns `None` for empty input, for text that cleans to nothing, and for
/// anything longer than [`MAX_ANSWER_TOKENS`] tokens. The relation is not
/// used yet; cleaning is the same for every relation.
pub fn normalize(raw: Option<&str>, _relation: RelationType) -> Option<String> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    let text = STRIP_CHARS.replace_all(text, "");
    let text = text.split('\n').next().unwrap_or_default();
    let text = PARENTHESIZED.replace_all(text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.is_empty() || text.split_whitespace().count() > MAX_ANSWER_TOKENS {
        return None;
    }
    Some(text.to_string())
}
