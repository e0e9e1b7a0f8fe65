//! ProfileBuilder: turns cleaned resume text into a `CandidateProfile`.
//!
//! Local mode (no oracle) fills contact fields only. Oracle mode asks an
//! external structured-extraction service for the full profile, retrying with
//! a corrective prompt on unusable output and degrading to the local profile
//! when the oracle stays unavailable. The oracle call is the only blocking
//! point in the pipeline and is always bounded by `OraclePolicy::timeout`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::intake::extractor::ExtractionError;
use crate::intake::local::{find_email, find_phone, local_profile};
use crate::intake::prompts::{
    PROFILE_CORRECTIVE_PROMPT, PROFILE_PARSE_PROMPT, PROFILE_PARSE_SYSTEM,
};
use crate::intake::sanitize::sanitize_for_oracle;
use crate::intake::validation::{parse_payload, validate_profile, ValidationError};
use crate::llm_client::LlmClient;
use crate::models::CandidateProfile;

/// Placeholder keys shipped in sample configs; treated as "no credential".
const PLACEHOLDER_KEYS: &[&str] = &["YOUR_API_KEY_HERE", "changeme", "xxx"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OracleError {
    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle rejected the request: {0}")]
    Rejected(String),
}

/// External structured-extraction capability. Returns the raw response text.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, OracleError>;
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("oracle response could not be coerced into a profile: {0}")]
    Validation(#[from] ValidationError),

    #[error("no text to build a profile from")]
    EmptyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMode {
    Local,
    Oracle,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    #[serde(flatten)]
    pub profile: CandidateProfile,
    pub mode: ProfileMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for OraclePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// Normalises an optional credential: blank and placeholder keys count as absent.
pub fn usable_credential(api_key: Option<&str>) -> Option<&str> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty() && !PLACEHOLDER_KEYS.contains(key))
}

#[derive(Clone)]
pub struct ProfileBuilder {
    oracle: Option<Arc<dyn Oracle>>,
    policy: OraclePolicy,
}

impl ProfileBuilder {
    pub fn local() -> Self {
        Self {
            oracle: None,
            policy: OraclePolicy::default(),
        }
    }

    pub fn with_oracle(oracle: Arc<dyn Oracle>, policy: OraclePolicy) -> Self {
        Self {
            oracle: Some(oracle),
            policy,
        }
    }

    /// Oracle mode backed by the LLM client when a usable credential is given,
    /// local mode otherwise.
    pub fn from_credentials(api_key: Option<&str>, policy: OraclePolicy) -> Self {
        match usable_credential(api_key) {
            Some(key) => Self::with_oracle(Arc::new(LlmClient::new(key.to_string())), policy),
            None => Self {
                oracle: None,
                policy,
            },
        }
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub async fn build(&self, text: &str) -> Result<BuildOutcome, IntakeError> {
        if text.trim().is_empty() {
            return Err(IntakeError::EmptyText);
        }

        match &self.oracle {
            None => {
                debug!("No oracle credential; building profile in local mode");
                Ok(BuildOutcome {
                    profile: local_profile(text),
                    mode: ProfileMode::Local,
                    warnings: vec![],
                })
            }
            Some(oracle) => self.build_with_oracle(oracle.as_ref(), text).await,
        }
    }

    async fn build_with_oracle(
        &self,
        oracle: &dyn Oracle,
        text: &str,
    ) -> Result<BuildOutcome, IntakeError> {
        let sanitized = sanitize_for_oracle(text);
        let max_attempts = self.policy.max_attempts.max(1);

        let mut prompt = PROFILE_PARSE_PROMPT.replace("{resume_text}", &sanitized);
        let mut last_failure = String::new();
        // Stays Some only while every attempt returned well-formed, non-object JSON.
        let mut incoherent_shape: Option<ValidationError> = None;
        let mut all_incoherent = true;

        for attempt in 1..=max_attempts {
            let call = oracle.complete(PROFILE_PARSE_SYSTEM, &prompt);
            let response = match tokio::time::timeout(self.policy.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(OracleError::Timeout(self.policy.timeout)),
            };

            let failure = match response {
                Ok(body) => match parse_payload(&body) {
                    Ok(payload) => {
                        let validated = validate_profile(&payload);
                        info!(
                            "Oracle profile accepted on attempt {attempt} ({} correction(s))",
                            validated.corrections.len()
                        );
                        let mut profile = validated.profile;
                        profile.raw_text = text.to_string();
                        if profile.email.is_none() {
                            profile.email = find_email(text);
                        }
                        if profile.phone.is_none() {
                            profile.phone = find_phone(text);
                        }
                        return Ok(BuildOutcome {
                            profile,
                            mode: ProfileMode::Oracle,
                            warnings: validated.corrections,
                        });
                    }
                    Err(err @ ValidationError::NotAnObject(_)) => {
                        let message = err.to_string();
                        incoherent_shape = Some(err);
                        message
                    }
                    Err(err) => {
                        all_incoherent = false;
                        err.to_string()
                    }
                },
                Err(err) => {
                    all_incoherent = false;
                    err.to_string()
                }
            };

            warn!("Oracle attempt {attempt}/{max_attempts} unusable: {failure}");
            prompt = PROFILE_CORRECTIVE_PROMPT
                .replace("{problem}", &failure)
                .replace("{resume_text}", &sanitized);
            last_failure = failure;
        }

        if all_incoherent {
            if let Some(err) = incoherent_shape {
                return Err(IntakeError::Validation(err));
            }
        }

        warn!("Oracle unavailable after {max_attempts} attempt(s); degrading to local profile");
        Ok(BuildOutcome {
            profile: local_profile(text),
            mode: ProfileMode::Degraded,
            warnings: vec![format!(
                "oracle unavailable after {max_attempts} attempt(s) ({last_failure}); profile built in local mode"
            )],
        })
    }
}

/// Builds a profile from cleaned text, selecting the mode from the credential.
pub async fn build(
    text: &str,
    api_key: Option<&str>,
    policy: OraclePolicy,
) -> Result<BuildOutcome, IntakeError> {
    ProfileBuilder::from_credentials(api_key, policy)
        .build(text)
        .await
}
