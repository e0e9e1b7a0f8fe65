//! JobCorpus: the read-only posting collection ranking runs against.
//!
//! Readers take an `Arc<CorpusSnapshot>` and keep it for the whole ranking
//! call, so a concurrent `replace` is never observed half-applied.

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::matching::embedding::Embedder;
use crate::models::JobPosting;

#[derive(Debug, Clone, Serialize)]
pub struct CorpusSnapshot {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub postings: Vec<JobPosting>,
}

impl CorpusSnapshot {
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// Accepts either a bare array or `{"postings": [...]}`. Used for corpus
/// files and for corpus uploads.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PostingList {
    Bare(Vec<JobPosting>),
    Wrapped { postings: Vec<JobPosting> },
}

impl PostingList {
    pub fn into_postings(self) -> Vec<JobPosting> {
        match self {
            PostingList::Bare(postings) | PostingList::Wrapped { postings } => postings,
        }
    }
}

/// Embeds `title + description` for postings whose vector is missing or was
/// produced with a different dimension than `embedder`.
pub fn prepare_postings(mut postings: Vec<JobPosting>, embedder: &dyn Embedder) -> Vec<JobPosting> {
    let mut embedded = 0usize;
    for posting in postings.iter_mut() {
        if posting.embedding.len() != embedder.dims() {
            if !posting.embedding.is_empty() {
                warn!(
                    "Posting {} has a {}-dim embedding; re-embedding at {} dims",
                    posting.id,
                    posting.embedding.len(),
                    embedder.dims()
                );
            }
            posting.embedding = embedder.embed(&posting.text());
            embedded += 1;
        }
    }
    if embedded > 0 {
        info!("Embedded {embedded} posting(s) locally");
    }
    postings
}

pub struct JobCorpus {
    current: RwLock<Arc<CorpusSnapshot>>,
}

impl Default for JobCorpus {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl JobCorpus {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self {
            current: RwLock::new(Arc::new(CorpusSnapshot {
                version: 1,
                loaded_at: Utc::now(),
                postings,
            })),
        }
    }

    /// Loads a JSON corpus file. No path, or a path that does not exist,
    /// yields an empty corpus.
    pub fn load_json(path: Option<&Path>, embedder: &dyn Embedder) -> Result<Self> {
        let Some(path) = path else {
            info!("No corpus path configured; starting with an empty corpus");
            return Ok(Self::default());
        };
        if !path.exists() {
            warn!("Corpus file {} not found; starting empty", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
        let postings = serde_json::from_str::<PostingList>(&raw)
            .with_context(|| format!("Corpus file {} is not a valid posting list", path.display()))?
            .into_postings();

        info!("Loaded {} posting(s) from {}", postings.len(), path.display());
        Ok(Self::new(prepare_postings(postings, embedder)))
    }

    pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Atomically swaps in a new posting set and returns its version.
    pub fn replace(&self, postings: Vec<JobPosting>) -> u64 {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let version = guard.version + 1;
        *guard = Arc::new(CorpusSnapshot {
            version,
            loaded_at: Utc::now(),
            postings,
        });
        info!("Corpus replaced: version {version}, {} posting(s)", guard.len());
        version
    }
}
