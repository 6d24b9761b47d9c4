use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

/// Message shown when page data cannot be fetched even after re-injecting the capture script.
pub const REFRESH_PAGE_MESSAGE: &str = "Please refresh the page you want to analyze.";

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Backend error (status: {status:?}): {message}")]
    Backend {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Inspector error: {0}")]
    Inspector(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl InspectError {
    pub fn backend(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        InspectError::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn browser(message: impl Into<String>) -> Self {
        InspectError::Browser(message.into())
    }

    pub fn inspector(message: impl Into<String>) -> Self {
        InspectError::Inspector(message.into())
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        InspectError::Extraction(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            InspectError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            InspectError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and that the backend is running (dinspect serve).",
            ),
            InspectError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify URL/format (e.g., https://example.com).",
            ),
            InspectError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "The captured screenshot could not be decoded or cropped; retry the capture.",
            ),
            InspectError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check snapshot/JSON inputs; run with --verbose for details.",
            ),
            InspectError::Browser(msg) => browser_payload(msg),
            InspectError::Backend { status, message } => ErrorPayload::new(
                ErrorCategory::Backend,
                format!("Backend error (status {:?}): {}", status, message),
                "Start the backend with `dinspect serve` and set GEMINI_API_KEY; check --backend-url.",
            ),
            InspectError::Upstream(msg) => ErrorPayload::new(
                ErrorCategory::Backend,
                msg.to_string(),
                "Check GEMINI_API_KEY, the configured model and upstream quota.",
            ),
            InspectError::Clipboard(msg) => ErrorPayload::new(
                ErrorCategory::Inspector,
                msg.to_string(),
                "Clipboard access failed; rerun with --no-copy to print the prompt instead.",
            ),
            InspectError::Inspector(msg) => ErrorPayload::new(
                ErrorCategory::Inspector,
                msg.to_string(),
                "Check the --selector value matches an element on the page.",
            ),
            InspectError::Extraction(msg) => ErrorPayload::new(
                ErrorCategory::Inspector,
                msg.to_string(),
                "The page carries a value an extractor cannot read; run with --verbose to see which one.",
            ),
            InspectError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("gemini_api_key") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set GEMINI_API_KEY (or [server].api_key in the config file) before running `dinspect serve`.",
                    )
                } else if lower.contains("snapshot file not found") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Pass an http(s) URL or the path of a snapshot written by `dinspect capture`.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths (e.g., --viewport WIDTHxHEIGHT) and the config file.",
                    )
                }
            }
            InspectError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

fn browser_payload(msg: &str) -> ErrorPayload {
    let lower = msg.to_ascii_lowercase();
    let remediation = if lower.contains("playwright npm package is missing") {
        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`)."
    } else if lower.contains("chromium executable") {
        "Run `npx playwright install chromium` (or `playwright install chromium`) to download the browser."
    } else if lower.contains("not found on path") || lower.contains("node command") {
        "Install Node.js and ensure the node binary is on PATH; rerun after installing Playwright if needed."
    } else if lower.contains("refresh the page") {
        "Reload the page (or rerun the command) so the capture script can be injected again."
    } else if lower.contains("timeout") || lower.contains("timed out") {
        "Try increasing --nav-timeout/--network-idle-timeout or ensure the page loads without blocking."
    } else {
        "Re-run with --verbose to see the Playwright helper output."
    };
    ErrorPayload::new(ErrorCategory::Browser, msg.to_string(), remediation)
}

pub type Result<T> = std::result::Result<T, InspectError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Browser,
    Backend,
    Image,
    Inspector,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
