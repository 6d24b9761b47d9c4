//! Gemini `generateContent` client used to refine element prompts.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{InspectError, Result};

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Instruction sent ahead of the element context and screenshot.
pub const SYSTEM_PROMPT: &str = "
You are an expert UI/UX Engineer. Refine this AI prompt for a frontend component.
The user provided:
1. HTML/CSS Context.
2. A Screenshot.

Task:
- Compare code vs screenshot.
- Identify missing visual details (gradients, shadows, textures).
- Rewrite the prompt to be pixel-perfect.
- OUTPUT ONLY the final prompt. No markdown, no chat.
";

/// Turns a screenshot and its styled-markup context into a refined prompt.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    /// `image_base64` is bare base64 PNG data, without a `data:` prefix.
    async fn refine(&self, image_base64: &str, context: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// System prompt, context and screenshot as the parts of one user turn.
    pub fn for_element(image_base64: &str, context: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: SYSTEM_PROMPT.to_string(),
                    },
                    Part::Text {
                        text: format!("Context:\n{context}"),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: image_base64.to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, model, BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(InspectError::Network)?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        );
        debug!(model = %self.model, "gemini generateContent");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| InspectError::Upstream(e.without_url().to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InspectError::Upstream(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(InspectError::Upstream(message));
        }

        serde_json::from_str(&body)
            .map_err(|e| InspectError::Upstream(format!("Failed to parse Gemini response: {e}")))
    }
}

#[async_trait]
impl PromptGenerator for GeminiClient {
    async fn refine(&self, image_base64: &str, context: &str) -> Result<String> {
        let request = GenerateContentRequest::for_element(image_base64, context);
        let response = self.generate_content(&request).await?;
        response
            .text()
            .ok_or_else(|| InspectError::Upstream("Gemini returned no text".to_string()))
    }
}
