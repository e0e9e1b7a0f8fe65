//! Neutralises resume text before it leaves the process.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on characters sent to the oracle.
pub const MAX_ORACLE_CHARS: usize = 24_000;

const REDACTED: &str = "[REDACTED]";

static SSN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid ssn regex"));

static CARD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{4}[ -]?){3}\d{4}\b").expect("valid card number regex")
});

pub fn sanitize_for_oracle(text: &str) -> String {
    let without_controls: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let redacted = SSN.replace_all(&without_controls, REDACTED);
    let redacted = CARD_NUMBER.replace_all(&redacted, REDACTED);

    // The prompt wraps the resume in a fenced block; the resume must not close it.
    let fenced = redacted.replace("```", "'''");

    truncate_chars(&fenced, MAX_ORACLE_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
