//! Stated-preference score: how well a posting title matches what the
//! candidate said they want.

use std::collections::HashSet;

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tokenised job interests, prepared once per ranking call.
#[derive(Debug, Clone, Default)]
pub struct InterestScorer {
    interests: Vec<HashSet<String>>,
}

impl InterestScorer {
    pub fn new<S: AsRef<str>>(interests: &[S]) -> Self {
        let interests = interests
            .iter()
            .map(|i| tokens(i.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { interests }
    }

    pub fn is_stated(&self) -> bool {
        !self.interests.is_empty()
    }

    /// Best |interest ∩ title| / |interest| over all interests, or `None`
    /// when the candidate stated no interests.
    pub fn score(&self, title: &str) -> Option<f64> {
        if !self.is_stated() {
            return None;
        }
        let title = tokens(title);
        let best = self
            .interests
            .iter()
            .map(|interest| {
                let overlap = interest.intersection(&title).count();
                overlap as f64 / interest.len() as f64
            })
            .fold(0.0, f64::max);
        Some(best)
    }
}
