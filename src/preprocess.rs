//! Cleanup applied to OCR output before it is handed to the NLP pipeline.
//!
//! Entity offsets refer to the cleaned text, so these run before annotation,
//! never between annotation and rendering.

use std::sync::OnceLock;

use regex::Regex;

static HYPHEN_BREAK: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();
static PUNCTUATION: OnceLock<Regex> = OnceLock::new();

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern"))
}

/// Replace newlines with spaces.
pub fn clean_text(text: &str) -> String {
    text.replace('\n', " ")
}

/// Join words hyphenated across line breaks, collapse whitespace runs to one
/// space, remove punctuation and trim.
pub fn preprocess_text(text: &str) -> String {
    let joined = regex(&HYPHEN_BREAK, r"-\n").replace_all(text, "");
    let collapsed = regex(&WHITESPACE_RUN, r"\s+").replace_all(&joined, " ");
    let stripped = regex(&PUNCTUATION, r"[^\w\s]").replace_all(&collapsed, "");
    stripped.trim().to_string()
}
