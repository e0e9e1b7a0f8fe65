use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::builder::{usable_credential, BuildOutcome, ProfileBuilder};
use crate::intake::parse_resume;
use crate::state::AppState;

/// Upload guardrail, also applied as the route's body limit.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// POST /api/v1/resumes/parse
/// Multipart: `file` (PDF bytes, required), `api_key` (optional oracle credential).
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BuildOutcome>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("parse_resume", %request_id);

    async move {
        let mut document: Option<Vec<u8>> = None;
        let mut api_key: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            match field.name() {
                Some("file") => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("could not read file: {e}")))?;
                    if bytes.len() > MAX_UPLOAD_BYTES {
                        return Err(AppError::BadRequest("upload exceeds 20MB limit".into()));
                    }
                    document = Some(bytes.to_vec());
                }
                Some("api_key") => {
                    let key = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("could not read api_key: {e}")))?;
                    api_key = Some(key);
                }
                _ => {}
            }
        }

        let document =
            document.ok_or_else(|| AppError::BadRequest("missing multipart field 'file'".into()))?;
        info!("Received resume upload ({} bytes)", document.len());

        // A usable request credential overrides the server's configured oracle.
        let builder = match usable_credential(api_key.as_deref()) {
            Some(key) => ProfileBuilder::from_credentials(Some(key), state.policy),
            None => state.profile_builder.clone(),
        };

        let outcome = parse_resume(document, state.extractor.clone(), &builder).await?;
        info!(
            "Profile built: mode={:?}, skills={}, warnings={}",
            outcome.mode,
            outcome.profile.skills.len(),
            outcome.warnings.len()
        );
        Ok::<_, AppError>(Json(outcome))
    }
    .instrument(span)
    .await
}
