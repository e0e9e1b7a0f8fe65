use std::sync::Arc;

use crate::config::Config;
use crate::intake::{OraclePolicy, ProfileBuilder, TextExtractor};
use crate::matching::{Embedder, HashingEmbedder, JobCorpus};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Staged extraction chain (pdf-extract, lopdf, OCR when enabled).
    pub extractor: Arc<TextExtractor>,
    /// Built from the configured credential; a request-supplied key overrides it.
    pub profile_builder: ProfileBuilder,
    pub policy: OraclePolicy,
    pub corpus: Arc<JobCorpus>,
    pub embedder: Arc<dyn Embedder>,
}

impl AppState {
    pub fn new(config: Config, corpus: JobCorpus) -> Self {
        let policy = config.oracle_policy();
        Self {
            extractor: Arc::new(TextExtractor::from_config(&config.ocr)),
            profile_builder: ProfileBuilder::from_credentials(
                config.oracle_api_key.as_deref(),
                policy,
            ),
            policy,
            corpus: Arc::new(corpus),
            embedder: Arc::new(HashingEmbedder::new(config.embedding_dims)),
            config,
        }
    }
}
