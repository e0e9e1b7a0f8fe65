use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::profile::Seniority;

/// A posting from the external corpus. Never mutated by the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub required_experience: Seniority,
    /// Precomputed embedding. Empty means "not embedded yet".
    #[serde(default)]
    pub embedding: Vec<f32>,
    /// Free-form fields carried through to the ranked output.
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl JobPosting {
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }
}

/// Per-component scores behind a composite, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub semantic: f64,
    pub skill: f64,
    /// Seniority compatibility.
    pub preference: f64,
    /// Stated-preference score; `None` when the candidate stated no interests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(rename = "id")]
    pub job_id: String,
    pub score: f64,
    pub component_scores: ComponentScores,
    pub meta: Value,
}
