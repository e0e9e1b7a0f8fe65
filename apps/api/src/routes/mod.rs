pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::intake::handlers::{handle_parse_resume, MAX_UPLOAD_BYTES};
use crate::matching::handlers::{handle_rank, handle_replace_corpus};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume intake
        .route(
            "/api/v1/resumes/parse",
            // Headroom for multipart framing and the api_key field.
            post(handle_parse_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        // Job matching
        .route("/api/v1/rank", post(handle_rank))
        .route("/api/v1/corpus", put(handle_replace_corpus))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::intake::stages::{ExtractionMethod, ExtractionStage, StageError};
    use crate::intake::TextExtractor;
    use crate::matching::corpus::prepare_postings;
    use crate::matching::{HashingEmbedder, JobCorpus};

    const BOUNDARY: &str = "credx-test-boundary";

    struct FixedStage(&'static str);

    impl ExtractionStage for FixedStage {
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::PdfExtract
        }

        fn extract(&self, _document: &[u8]) -> Result<String, StageError> {
            Ok(self.0.to_string())
        }
    }

    fn test_state(stage_text: &'static str) -> AppState {
        let postings = serde_json::from_value(json!([
            {"id": "py", "title": "Data Engineer", "required_skills": ["Python"],
             "required_experience": "Mid", "meta": {"company": "Acme"}},
            {"id": "rn", "title": "Registered Nurse", "required_skills": ["Triage"],
             "required_experience": "Senior"}
        ]))
        .unwrap();
        let corpus = JobCorpus::new(prepare_postings(postings, &HashingEmbedder::default()));
        let mut state = AppState::new(Config::default(), corpus);
        state.extractor = Arc::new(TextExtractor::new(vec![Box::new(FixedStage(stage_text))]));
        state
    }

    fn multipart_body(parts: &[(&str, &str)]) -> Body {
        let mut body = Vec::new();
        for (name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = if *name == "file" {
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"resume.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
            } else {
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn parse_request(parts: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/parse")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart_body(parts))
            .unwrap()
    }

    fn rank_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/rank")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_corpus() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(test_state("unused"), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "credx-api");
        assert_eq!(body["corpus_size"], 2);
        assert_eq!(body["corpus_version"], 1);
    }

    #[tokio::test]
    async fn test_parse_resume_local_mode() {
        let state = test_state("Jane Roe\njane@example.com\n(555) 123-4567\nData engineer.");
        let (status, body) = send(state, parse_request(&[("file", "%PDF-1.4 fake")])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "local");
        assert_eq!(body["email"], "jane@example.com");
        assert_eq!(body["phone"], "(555) 123-4567");
        assert_eq!(body["seniority_level"], "Unknown");
        assert_eq!(body["confidence"], 0.0);
    }

    #[tokio::test]
    async fn test_parse_resume_placeholder_key_stays_local() {
        let state = test_state("Jane Roe\njane@example.com\nSenior data engineer at Acme.");
        let request = parse_request(&[
            ("file", "%PDF-1.4 fake"),
            ("api_key", "YOUR_API_KEY_HERE"),
        ]);
        let (status, body) = send(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "local");
    }

    #[tokio::test]
    async fn test_parse_resume_unusable_text_is_422() {
        let (status, body) = send(test_state("tiny"), parse_request(&[("file", "%PDF")])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_parse_resume_missing_file_is_400() {
        let request = parse_request(&[("api_key", "sk-test")]);
        let (status, body) = send(test_state("unused"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_rank_skill_only() {
        let request = rank_request(json!({
            "text": "",
            "profile": {"skills": ["python", "SQL"], "seniority_level": "Mid"},
            "weights": {"semantic": 0, "preference": 0, "skill_relevance": 1, "experience": 0},
            "top_k": 10
        }));
        let (status, body) = send(test_state("unused"), request).await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "py");
        assert_eq!(results[0]["score"], 1.0);
        assert_eq!(results[0]["meta"]["title"], "Data Engineer");
        assert_eq!(results[0]["meta"]["company"], "Acme");
    }

    #[tokio::test]
    async fn test_rank_experience_only_mid_against_senior() {
        let request = rank_request(json!({
            "profile": {"seniority_level": "Mid"},
            "required_experience": "Senior",
            "weights": {"semantic": 0, "preference": 0, "skill_relevance": 0, "experience": 1}
        }));
        let (status, body) = send(test_state("unused"), request).await;

        assert_eq!(status, StatusCode::OK);
        for result in body["results"].as_array().unwrap() {
            assert_eq!(result["component_scores"]["preference"], 0.5);
            assert_eq!(result["score"], 0.5);
        }
    }

    #[tokio::test]
    async fn test_replace_corpus_then_rank() {
        let state = test_state("unused");
        let upload = Request::builder()
            .method("PUT")
            .uri("/api/v1/corpus")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"postings": [{"id": "w", "title": "Welder", "required_experience": null}]})
                    .to_string(),
            ))
            .unwrap();
        let (status, body) = send(state.clone(), upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], 2);
        assert_eq!(body["size"], 1);

        let (_, body) = send(state, rank_request(json!({}))).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "w");
    }

    #[tokio::test]
    async fn test_rank_top_k_zero_is_empty() {
        let (status, body) = send(test_state("unused"), rank_request(json!({"top_k": 0}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn test_rank_negative_weight_is_config_error() {
        let request = rank_request(json!({"weights": {"experience": -0.5}}));
        let (status, body) = send(test_state("unused"), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "CONFIG_ERROR");
    }
}
