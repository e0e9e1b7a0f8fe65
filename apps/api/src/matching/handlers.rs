use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::matching::corpus::{prepare_postings, PostingList};
use crate::matching::request::{run_rank, RankRequest, RankResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CorpusReplaced {
    pub version: u64,
    pub size: usize,
}

/// POST /api/v1/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let snapshot = state.corpus.snapshot();
    let embedder = state.embedder.clone();

    // Scoring fans out over the rayon pool; keep it off the async workers.
    let response =
        tokio::task::spawn_blocking(move || run_rank(&req, &snapshot, embedder.as_ref()))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("ranking task failed: {e}")))??;

    info!("Rank request served: {} result(s)", response.results.len());
    Ok(Json(response))
}

/// PUT /api/v1/corpus
/// Swaps the server corpus. In-flight rank calls finish on the old snapshot.
pub async fn handle_replace_corpus(
    State(state): State<AppState>,
    Json(body): Json<PostingList>,
) -> Result<Json<CorpusReplaced>, AppError> {
    let embedder = state.embedder.clone();
    let corpus = state.corpus.clone();

    let replaced = tokio::task::spawn_blocking(move || {
        let postings = prepare_postings(body.into_postings(), embedder.as_ref());
        let size = postings.len();
        CorpusReplaced {
            version: corpus.replace(postings),
            size,
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("corpus replace task failed: {e}")))?;

    info!(
        "Corpus upload applied: version {}, {} posting(s)",
        replaced.version, replaced.size
    );
    Ok(Json(replaced))
}
