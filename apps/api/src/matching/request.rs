//! Ranking requests: resolving the candidate side and the requirement side,
//! then running the ranker against one corpus snapshot. Shared by the HTTP
//! handler and the CLI.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::intake::validation::validate_profile;
use crate::matching::corpus::{prepare_postings, CorpusSnapshot};
use crate::matching::embedding::Embedder;
use crate::matching::ranker::{CandidateQuery, Requirements, WeightedRanker};
use crate::matching::weights::{ConfigError, WeightVector};
use crate::models::profile::dedup_case_insensitive;
use crate::models::{CandidateProfile, RankedResult, Seniority};

pub const DEFAULT_TOP_K: i64 = 10;

fn default_top_k() -> i64 {
    DEFAULT_TOP_K
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankRequest {
    /// Free text appended to the candidate's semantic text.
    #[serde(default)]
    pub text: String,
    /// When non-empty, replaces every posting's `required_skills`.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// A recognised level replaces every posting's `required_experience`.
    #[serde(default)]
    pub required_experience: Option<String>,
    #[serde(default)]
    pub weights: Option<WeightVector>,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    /// A parsed profile; auto-corrected the same way oracle payloads are.
    #[serde(default)]
    pub profile: Option<Map<String, Value>>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Replaces the server corpus for this request.
    #[serde(default)]
    pub postings: Option<Vec<crate::models::JobPosting>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankResponse {
    pub results: Vec<RankedResult>,
}

impl RankRequest {
    /// The candidate profile this request ranks for.
    pub fn resolve_profile(&self) -> CandidateProfile {
        let mut profile = self
            .profile
            .as_ref()
            .map(|payload| validate_profile(payload).profile)
            .unwrap_or_default();

        let mut interests = std::mem::take(&mut profile.job_interests);
        interests.extend(self.interests.iter().cloned());
        profile.job_interests = dedup_case_insensitive(interests);
        profile
    }

    /// The requirement side this request imposes on every posting.
    pub fn requirements(&self) -> Requirements {
        let skills = dedup_case_insensitive(&self.required_skills);
        Requirements {
            skills: (!skills.is_empty()).then_some(skills),
            experience: self
                .required_experience
                .as_deref()
                .and_then(Seniority::parse)
                .filter(|level| *level != Seniority::Unknown),
        }
    }

    pub fn resolve_query(&self, embedder: &dyn Embedder) -> CandidateQuery {
        let profile = self.resolve_profile();
        let semantic_text = match (profile.semantic_text(), self.text.trim()) {
            (base, "") => base,
            (base, extra) if base.is_empty() => extra.to_string(),
            (base, extra) => format!("{base}\n{extra}"),
        };
        CandidateQuery {
            embedding: embedder.embed(&semantic_text),
            skills: profile.skills,
            seniority: profile.seniority_level,
            interests: profile.job_interests,
        }
    }
}

/// Ranks against the request's own postings when supplied, else `corpus`.
pub fn run_rank(
    request: &RankRequest,
    corpus: &CorpusSnapshot,
    embedder: &dyn Embedder,
) -> Result<RankResponse, ConfigError> {
    let weights = request.weights.unwrap_or(WeightVector::DEFAULT_REQUEST);
    let query = request.resolve_query(embedder);
    let requirements = request.requirements();

    let results = match &request.postings {
        Some(postings) => {
            let postings = prepare_postings(postings.clone(), embedder);
            WeightedRanker::rank_with(&query, &requirements, &postings, &weights, request.top_k)?
        }
        None => WeightedRanker::rank_with(
            &query,
            &requirements,
            &corpus.postings,
            &weights,
            request.top_k,
        )?,
    };
    debug!(
        "Ranked corpus v{} for top_k={}: {} result(s)",
        corpus.version,
        request.top_k,
        results.len()
    );
    Ok(RankResponse { results })
}
