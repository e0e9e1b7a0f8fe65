//! Local-mode extraction: only the fields a pattern match can recover.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::CandidateProfile;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("valid email regex")
});

// North-American 3-3-4 grouping (optionally with a country code), or an
// international "+CC NNNNN NNNNN" layout.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{3}\)|\b\d{3})[\s.-]?\d{3}[\s.-]?\d{4}\b|\+\d{1,3}[\s.-]?\d{4,5}[\s.-]?\d{5,6}\b",
    )
    .expect("valid phone regex")
});

pub fn find_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

pub fn find_phone(text: &str) -> Option<String> {
    PHONE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Profile built without the oracle: contact fields only, confidence 0.
pub fn local_profile(text: &str) -> CandidateProfile {
    CandidateProfile::local(text, find_email(text), find_phone(text))
}
