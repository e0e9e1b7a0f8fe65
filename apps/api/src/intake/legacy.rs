//! `ResumeParser`: object-style entry point kept for callers that predate the
//! free `extract` / `build` functions. Holds configuration only.

use std::sync::Arc;

use crate::intake::builder::{BuildOutcome, IntakeError, OraclePolicy, ProfileBuilder};
use crate::intake::{parse_resume, TextExtractor};

#[derive(Debug, Clone, Default)]
pub struct ResumeParser {
    api_key: Option<String>,
    policy: OraclePolicy,
}

impl ResumeParser {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            policy: OraclePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OraclePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Extracts with the default stage chain, then builds.
    pub async fn parse(&self, document: &[u8]) -> Result<BuildOutcome, IntakeError> {
        let builder = ProfileBuilder::from_credentials(self.api_key(), self.policy);
        parse_resume(
            document.to_vec(),
            Arc::new(TextExtractor::default()),
            &builder,
        )
        .await
    }
}
