//! WeightedRanker: composite scoring of every posting against one candidate,
//! fanned out across the rayon pool, then a single gather-sort-truncate.
//!
//! composite = semantic * w.semantic
//!           + skill    * w.skill_relevance
//!           + seniority * w.experience
//!           + stated   * w.preference      (0 when no interests were stated)
//!
//! Every component is clamped to [0, 1] and the weights are normalised, so the
//! composite is in [0, 1]. Ties keep corpus order.
//!
//! [`Requirements`] set by the caller replace each posting's own
//! `required_skills` / `required_experience` for that call.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde_json::Value;

use crate::matching::embedding::Embedder;
use crate::matching::interest::InterestScorer;
use crate::matching::semantic::SemanticScorer;
use crate::matching::seniority::seniority_score;
use crate::matching::skills::SkillScorer;
use crate::matching::weights::{ConfigError, WeightVector};
use crate::models::{CandidateProfile, ComponentScores, JobPosting, RankedResult, Seniority};

/// The candidate side of a ranking call, with its embedding precomputed.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub skills: Vec<String>,
    pub seniority: Seniority,
    pub interests: Vec<String>,
    pub embedding: Vec<f32>,
}

impl CandidateQuery {
    pub fn from_profile(profile: &CandidateProfile, embedder: &dyn Embedder) -> Self {
        Self {
            skills: profile.skills.clone(),
            seniority: profile.seniority_level,
            interests: profile.job_interests.clone(),
            embedding: embedder.embed(&profile.semantic_text()),
        }
    }
}

/// Per-call requirement overrides. `None` keeps the posting's own value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requirements {
    pub skills: Option<Vec<String>>,
    pub experience: Option<Seniority>,
}

fn unit(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub struct WeightedRanker;

impl WeightedRanker {
    /// Pure function of its inputs. `top_k <= 0` or an empty corpus yields
    /// an empty list; only invalid weights are an error.
    pub fn rank(
        query: &CandidateQuery,
        postings: &[JobPosting],
        weights: &WeightVector,
        top_k: i64,
    ) -> Result<Vec<RankedResult>, ConfigError> {
        Self::rank_with(query, &Requirements::default(), postings, weights, top_k)
    }

    pub fn rank_with(
        query: &CandidateQuery,
        requirements: &Requirements,
        postings: &[JobPosting],
        weights: &WeightVector,
        top_k: i64,
    ) -> Result<Vec<RankedResult>, ConfigError> {
        let w = weights.normalized()?;
        if top_k <= 0 || postings.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings: Vec<&[f32]> = postings.iter().map(|p| p.embedding.as_slice()).collect();
        let semantic = SemanticScorer::new(query.embedding.clone()).score_batch(&embeddings);
        let skills = SkillScorer::new(&query.skills);
        let fixed_skill = requirements.skills.as_deref().map(|req| skills.score(req));
        let interests = InterestScorer::new(&query.interests);

        let mut scored: Vec<(usize, RankedResult)> = postings
            .par_iter()
            .enumerate()
            .map(|(idx, posting)| {
                let skill =
                    fixed_skill.unwrap_or_else(|| skills.score(&posting.required_skills));
                let required = requirements
                    .experience
                    .unwrap_or(posting.required_experience);
                let components = ComponentScores {
                    semantic: unit(semantic[idx]),
                    skill: unit(skill),
                    preference: unit(seniority_score(query.seniority, required)),
                    interest: interests.score(&posting.title).map(unit),
                };
                let composite = components.semantic * w.semantic
                    + components.skill * w.skill_relevance
                    + components.preference * w.experience
                    + components.interest.unwrap_or(0.0) * w.preference;

                let mut meta = posting.meta.clone();
                meta.insert("title".to_string(), Value::String(posting.title.clone()));

                (
                    idx,
                    RankedResult {
                        job_id: posting.id.clone(),
                        score: unit(composite),
                        component_scores: components,
                        meta: Value::Object(meta),
                    },
                )
            })
            .collect();

        scored.sort_by(|(ia, a), (ib, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(ia.cmp(ib))
        });

        let keep = usize::try_from(top_k).unwrap_or(usize::MAX).min(scored.len());
        scored.truncate(keep);
        Ok(scored.into_iter().map(|(_, result)| result).collect())
    }
}
