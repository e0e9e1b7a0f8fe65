use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::intake::builder::IntakeError;
use crate::intake::extractor::ExtractionError;
use crate::intake::validation::ValidationError;
use crate::matching::weights::ConfigError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Extraction(e) => AppError::Extraction(e),
            IntakeError::Validation(e) => AppError::Validation(e),
            IntakeError::EmptyText => AppError::Extraction(ExtractionError::NoUsableText {
                best_chars: 0,
                attempts: vec![],
            }),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Extraction(e) => {
                tracing::warn!("Extraction failed: {e}");
                (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR", e.to_string())
            }
            AppError::Validation(e) => {
                tracing::error!("Oracle response unusable: {e}");
                (StatusCode::BAD_GATEWAY, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Config(e) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR", e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::from(IntakeError::Extraction(ExtractionError::EmptyDocument)),
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
            ),
            (
                AppError::from(IntakeError::Validation(ValidationError::NotAnObject("array"))),
                StatusCode::BAD_GATEWAY,
                "VALIDATION_ERROR",
            ),
            (
                AppError::from(ConfigError::InvalidWeight {
                    name: "semantic",
                    value: -1.0,
                }),
                StatusCode::BAD_REQUEST,
                "CONFIG_ERROR",
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let (got_status, got_code, _) = err.parts();
            assert_eq!(got_status, status);
            assert_eq!(got_code, code);
        }
    }

    #[test]
    fn test_internal_message_is_not_leaked() {
        let (_, _, message) = AppError::Internal(anyhow::anyhow!("secret path")).parts();
        assert!(!message.contains("secret"));
    }
}
