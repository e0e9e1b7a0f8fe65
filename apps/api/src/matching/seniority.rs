//! PreferenceScorer: seniority compatibility as a fixed lookup on ordinal distance.

use crate::models::Seniority;

/// Exact match 1.0, one step apart 0.5, further 0.0. `Unknown` on either
/// side is neutral and scores 0.5.
pub fn seniority_score(candidate: Seniority, required: Seniority) -> f64 {
    match (candidate.ordinal(), required.ordinal()) {
        (Some(c), Some(r)) => match c.abs_diff(r) {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        },
        _ => 0.5,
    }
}
