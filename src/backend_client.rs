use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{InspectError, Result};
use crate::inspector::PromptBackend;
use crate::protocol::GeneratePromptRequest;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const GENERATE_PROMPT_PATH: &str = "/api/generate-prompt";

/// HTTP client for a running `dinspect serve` backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct PromptBody {
    #[serde(default)]
    prompt: Option<String>,
}

impl BackendClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url_and_timeout(DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_base_url_and_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url_and_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(InspectError::Network)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(InspectError::InvalidUrl)
    }
}

#[async_trait]
impl PromptBackend for BackendClient {
    async fn generate_prompt(&self, request: GeneratePromptRequest) -> Result<String> {
        let url = self.endpoint(GENERATE_PROMPT_PATH)?;
        debug!(%url, context_len = request.context.len(), "posting enhance request");

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(InspectError::Network)?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(InspectError::backend(Some(status), error_message(status, &body)));
        }

        let parsed: PromptBody = serde_json::from_str(&body)?;
        match parsed.prompt {
            Some(prompt) if !prompt.trim().is_empty() => Ok(prompt),
            _ => Err(InspectError::backend(None, "No prompt returned")),
        }
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("backend returned status {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body_error_field() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"Missing image or context"}"#),
            "Missing image or context"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            "backend returned status 502"
        );
    }

    #[test]
    fn endpoint_joins_against_base_url() {
        let client = BackendClient::with_base_url("http://127.0.0.1:4000").unwrap();
        assert_eq!(
            client.endpoint(GENERATE_PROMPT_PATH).unwrap().as_str(),
            "http://127.0.0.1:4000/api/generate-prompt"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            BackendClient::with_base_url("not a url"),
            Err(InspectError::InvalidUrl(_))
        ));
    }
}
