// Resume intake: document bytes -> cleaned text -> CandidateProfile.
// Extraction is CPU/IO-bound and must run inside tokio::task::spawn_blocking.
// All oracle calls go through llm_client via the `Oracle` trait.

pub mod builder;
pub mod cleaning;
pub mod extractor;
pub mod handlers;
pub mod legacy;
pub mod local;
pub mod prompts;
pub mod sanitize;
pub mod stages;
pub mod validation;

use std::sync::Arc;

use tracing::debug;

pub use builder::{BuildOutcome, IntakeError, OraclePolicy, ProfileBuilder, ProfileMode};
pub use extractor::{ExtractedText, ExtractionError, TextExtractor};

/// Extracts cleaned text with the default stage chain.
pub fn extract(document: &[u8]) -> Result<ExtractedText, ExtractionError> {
    TextExtractor::default().extract(document)
}

/// Full intake pipeline: staged extraction off the async runtime, then profile building.
pub async fn parse_resume(
    document: Vec<u8>,
    extractor: Arc<TextExtractor>,
    builder: &ProfileBuilder,
) -> Result<BuildOutcome, IntakeError> {
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&document))
        .await
        .map_err(|e| {
            tracing::error!("Extraction task aborted: {e}");
            IntakeError::Extraction(ExtractionError::NoUsableText {
                best_chars: 0,
                attempts: vec![],
            })
        })??;

    debug!(
        "Extracted {} chars via {}",
        extracted.text.chars().count(),
        extracted.method.as_str()
    );
    builder.build(&extracted.text).await
}
