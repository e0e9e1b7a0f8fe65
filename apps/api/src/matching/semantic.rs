//! SemanticScorer: cosine similarity between the candidate embedding and each
//! posting embedding, clamped to [0, 1].

use rayon::prelude::*;

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

/// Cosine similarity clamped to [0, 1]. Mismatched dimensions, empty or
/// zero-norm vectors score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    SemanticScorer::new(a.to_vec()).score(b)
}

pub struct SemanticScorer {
    profile: Vec<f32>,
    profile_norm: f64,
}

impl SemanticScorer {
    pub fn new(profile: Vec<f32>) -> Self {
        let profile_norm = norm(&profile);
        Self {
            profile,
            profile_norm,
        }
    }

    pub fn score(&self, posting: &[f32]) -> f64 {
        if posting.len() != self.profile.len() || self.profile_norm == 0.0 {
            return 0.0;
        }
        let posting_norm = norm(posting);
        if posting_norm == 0.0 {
            return 0.0;
        }
        let dot: f64 = self
            .profile
            .iter()
            .zip(posting)
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum();
        let similarity = dot / (self.profile_norm * posting_norm);
        if similarity.is_finite() {
            similarity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Scores many postings at once; output order matches input order.
    pub fn score_batch(&self, postings: &[&[f32]]) -> Vec<f64> {
        postings.par_iter().map(|p| self.score(p)).collect()
    }
}
