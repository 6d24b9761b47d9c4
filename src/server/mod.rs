//! Local backend that refines element prompts with Gemini.
//!
//! ```text
//! GET  /                     liveness text
//! POST /api/generate-prompt  {image, context} -> {prompt} | {error}
//! ```

pub mod gemini;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{InspectError, Result};
use crate::protocol::{ErrorBody, GeneratePromptRequest, GeneratePromptResponse};

pub use gemini::{GeminiClient, PromptGenerator, DEFAULT_MODEL};

pub const LIVENESS_TEXT: &str = "Website Analyzer API (Gemini Native) is running...";
pub const MISSING_INPUT: &str = "Missing image or context";
pub const BODY_TOO_LARGE: &str = "Request body exceeds the 50 MB limit";

/// JSON bodies carry whole screenshots.
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

static DATA_URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|webp);base64,").expect("valid data URL regex")
});

#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn PromptGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn PromptGenerator>) -> Self {
        Self { generator }
    }
}

/// Strips a `data:image/...;base64,` header, leaving bare base64.
pub fn strip_data_url(image: &str) -> &str {
    match DATA_URL_PREFIX.find(image) {
        Some(prefix) => &image[prefix.end()..],
        None => image,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/generate-prompt", post(generate_prompt))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

async fn generate_prompt(
    State(state): State<AppState>,
    body: std::result::Result<Json<GeneratePromptRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) if request.is_complete() => request,
        Ok(_) => return bad_request(),
        Err(rejection) => {
            warn!(error = %rejection, "rejected generate-prompt body");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return (StatusCode::PAYLOAD_TOO_LARGE, Json(ErrorBody::new(BODY_TOO_LARGE)))
                    .into_response();
            }
            return bad_request();
        }
    };

    info!(context_len = request.context.len(), "analyzing element with Gemini");
    let image = strip_data_url(&request.image);
    match state.generator.refine(image, &request.context).await {
        Ok(prompt) => {
            info!("Gemini success");
            Json(GeneratePromptResponse { prompt }).into_response()
        }
        Err(err) => {
            warn!(error = %err, "Gemini request failed");
            let message = match err {
                InspectError::Upstream(message) => message,
                other => other.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(message))).into_response()
        }
    }
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(MISSING_INPUT))).into_response()
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is running on http://localhost:{}", addr.port());
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingGenerator {
        seen: Mutex<Vec<(String, String)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl PromptGenerator for RecordingGenerator {
        async fn refine(&self, image_base64: &str, context: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((image_base64.to_string(), context.to_string()));
            match &self.fail_with {
                Some(message) => Err(InspectError::Upstream(message.clone())),
                None => Ok("Refined prompt".to_string()),
            }
        }
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/generate-prompt")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn liveness_is_plain_text() {
        let app = router(AppState::new(Arc::new(RecordingGenerator::default())));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], LIVENESS_TEXT.as_bytes());
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_with_400() {
        let generator = Arc::new(RecordingGenerator::default());
        let app = router(AppState::new(generator.clone()));

        for body in [r#"{"image":"abc"}"#, r#"{"image":"","context":"x"}"#, "not json"] {
            let response = app.clone().oneshot(post_json(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(body_json(response).await["error"], MISSING_INPUT);
        }
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let generator = Arc::new(RecordingGenerator::default());
        let app = router(AppState::new(generator.clone()));

        let image = "A".repeat(BODY_LIMIT_BYTES);
        let body = format!(r#"{{"image":"{image}","context":"ctx"}}"#);
        let response = app.oneshot(post_json(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], BODY_TOO_LARGE);
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn data_url_prefix_is_stripped_before_generation() {
        let generator = Arc::new(RecordingGenerator::default());
        let app = router(AppState::new(generator.clone()));

        let response = app
            .oneshot(post_json(
                r#"{"image":"data:image/jpeg;base64,QUJD","context":"<div></div>","timestamp":1}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["prompt"], "Refined prompt");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0], ("QUJD".to_string(), "<div></div>".to_string()));
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_message_verbatim() {
        let generator = Arc::new(RecordingGenerator {
            fail_with: Some("API key not valid. Please pass a valid API key.".to_string()),
            ..RecordingGenerator::default()
        });
        let app = router(AppState::new(generator));

        let response = app
            .oneshot(post_json(r#"{"image":"QUJD","context":"ctx"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "API key not valid. Please pass a valid API key."
        );
    }

    #[test]
    fn only_known_image_prefixes_are_stripped() {
        assert_eq!(strip_data_url("data:image/webp;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("data:image/gif;base64,AAAA"), "data:image/gif;base64,AAAA");
        assert_eq!(strip_data_url("AAAA"), "AAAA");
    }
}
