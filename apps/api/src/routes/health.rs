use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the size and version of the loaded corpus.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let corpus = state.corpus.snapshot();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "credx-api",
        "corpus_size": corpus.len(),
        "corpus_version": corpus.version
    }))
}
