//! SkillScorer: fraction of a posting's required skills the candidate covers.
//!
//! Matching is case-insensitive and exact after alias canonicalisation.
//! Duplicate requirements (after canonicalisation) count once.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Known synonym spellings -> canonical skill name (both lowercase).
static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("js", "javascript"),
        ("ecmascript", "javascript"),
        ("ts", "typescript"),
        ("py", "python"),
        ("python3", "python"),
        ("golang", "go"),
        ("rustlang", "rust"),
        ("c++", "cpp"),
        ("c#", "csharp"),
        ("c sharp", "csharp"),
        ("node", "nodejs"),
        ("node.js", "nodejs"),
        ("react.js", "react"),
        ("reactjs", "react"),
        ("vue.js", "vue"),
        ("vuejs", "vue"),
        ("postgres", "postgresql"),
        ("psql", "postgresql"),
        ("mongo", "mongodb"),
        ("k8s", "kubernetes"),
        ("aws", "amazon web services"),
        ("gcp", "google cloud"),
        ("google cloud platform", "google cloud"),
        ("ml", "machine learning"),
        ("ai", "artificial intelligence"),
        ("nlp", "natural language processing"),
        ("ci/cd", "cicd"),
        ("ci cd", "cicd"),
        ("sklearn", "scikit-learn"),
        ("scikit learn", "scikit-learn"),
        ("tf", "tensorflow"),
        ("structured query language", "sql"),
    ])
});

/// Lowercases, trims, collapses inner whitespace and resolves aliases.
pub fn canonical_skill(skill: &str) -> String {
    let folded = skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    match ALIASES.get(folded.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => folded,
    }
}

/// Canonical form of a candidate skill set, built once per ranking call.
#[derive(Debug, Clone, Default)]
pub struct SkillScorer {
    candidate: HashSet<String>,
}

impl SkillScorer {
    pub fn new<S: AsRef<str>>(candidate_skills: &[S]) -> Self {
        let candidate = candidate_skills
            .iter()
            .map(|s| canonical_skill(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self { candidate }
    }

    /// |matched required| / |required|; no requirements means no penalty.
    pub fn score<S: AsRef<str>>(&self, required: &[S]) -> f64 {
        let required: HashSet<String> = required
            .iter()
            .map(|s| canonical_skill(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        if required.is_empty() {
            return 1.0;
        }
        let matched = required
            .iter()
            .filter(|skill| self.candidate.contains(*skill))
            .count();
        matched as f64 / required.len() as f64
    }
}
