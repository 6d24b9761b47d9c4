//! Message schemas for the three boundaries the inspector talks across.
//!
//! - [`ExtensionMessage`]: requests between the front end and the page
//!   session, tagged by `action`
//! - [`BridgeMessage`]: `window.postMessage` traffic between the isolated
//!   capture script and the page-context script, tagged by `type`
//! - [`GeneratePromptRequest`] / [`GeneratePromptResponse`] / [`ErrorBody`]:
//!   the backend HTTP bodies
//!
//! Replies that may fail use [`Reply`], which accepts either the success
//! body or `{ "error": "..." }`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InspectError;
use crate::types::{GsapTrigger, ScrollAnimationRecord};

/// Requests understood by the page session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    /// Capture the visible viewport as PNG; replies [`ScreenshotReply`].
    CaptureScreenshot,
    /// Forward a screenshot and context to the backend; replies [`GeneratePromptResponse`].
    AnalyzeImage { payload: GeneratePromptRequest },
    /// Turn the visual inspector on or off; replies [`StatusReply`].
    ToggleInspector { payload: bool },
    /// Run the page-data extractors; replies [`crate::types::InspectionData`].
    GetPageData,
    HighlightElement { selector: String },
    #[serde(rename_all = "camelCase")]
    ControlAnimation {
        animation_id: String,
        animation_action: AnimationAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    /// Pushed when a delayed scroll detection finds more than the first pass.
    #[serde(rename_all = "camelCase")]
    ScrollAnimationsUpdated {
        scroll_animations: Vec<ScrollAnimationRecord>,
    },
}

impl ExtensionMessage {
    pub fn action(&self) -> &'static str {
        match self {
            ExtensionMessage::CaptureScreenshot => "CAPTURE_SCREENSHOT",
            ExtensionMessage::AnalyzeImage { .. } => "ANALYZE_IMAGE",
            ExtensionMessage::ToggleInspector { .. } => "TOGGLE_INSPECTOR",
            ExtensionMessage::GetPageData => "GET_PAGE_DATA",
            ExtensionMessage::HighlightElement { .. } => "HIGHLIGHT_ELEMENT",
            ExtensionMessage::ControlAnimation { .. } => "CONTROL_ANIMATION",
            ExtensionMessage::ScrollAnimationsUpdated { .. } => "SCROLL_ANIMATIONS_UPDATED",
        }
    }
}

/// Messages exchanged with the page-context script over `window.postMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeMessage {
    DetectScrollAnimations,
    ScrollAnimationsDetected {
        #[serde(default)]
        animations: Vec<GsapTrigger>,
    },
    #[serde(rename_all = "camelCase")]
    ControlAnimation {
        animation_id: String,
        action: AnimationAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
}

/// Playback commands for a detected animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationAction {
    Restart,
    Play,
    /// Seek to a progress in `0..=1`
    SetProgress,
    /// Smooth-scroll the window to the trigger start
    ScrollTo,
}

impl AnimationAction {
    pub fn needs_value(self) -> bool {
        matches!(self, AnimationAction::SetProgress)
    }
}

impl fmt::Display for AnimationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnimationAction::Restart => "restart",
            AnimationAction::Play => "play",
            AnimationAction::SetProgress => "setProgress",
            AnimationAction::ScrollTo => "scrollTo",
        })
    }
}

impl FromStr for AnimationAction {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "restart" => Ok(AnimationAction::Restart),
            "play" => Ok(AnimationAction::Play),
            "setprogress" | "progress" => Ok(AnimationAction::SetProgress),
            "scrollto" => Ok(AnimationAction::ScrollTo),
            _ => Err(InspectError::Config(format!(
                "Unknown animation action: {s} (expected restart, play, set-progress or scroll-to)"
            ))),
        }
    }
}

/// Body of `POST /api/generate-prompt`.
///
/// Missing fields deserialize as empty strings; the server rejects empty
/// values the same way as absent ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratePromptRequest {
    /// Base64 PNG, optionally with a `data:image/...;base64,` prefix
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub context: String,
    /// Milliseconds since the Unix epoch at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl GeneratePromptRequest {
    pub fn is_complete(&self) -> bool {
        !self.image.is_empty() && !self.context.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratePromptResponse {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotReply {
    /// `data:image/png;base64,...`
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
}

impl StatusReply {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// A reply that is either `{ "error": ... }` or the success body.
///
/// The error arm is tried first, so success bodies whose fields are all
/// optional still never swallow an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Failed(ErrorBody),
    Ok(T),
}

impl<T> Reply<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Failed(body) => Err(body.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InspectionData;
    use serde_json::json;

    #[test]
    fn extension_messages_use_action_tags_and_camel_case_fields() {
        let msg = ExtensionMessage::ControlAnimation {
            animation_id: "gsap-st-0".into(),
            animation_action: AnimationAction::SetProgress,
            value: Some(0.5),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "CONTROL_ANIMATION",
                "animationId": "gsap-st-0",
                "animationAction": "setProgress",
                "value": 0.5
            })
        );
        assert_eq!(msg.action(), "CONTROL_ANIMATION");

        let toggle: ExtensionMessage =
            serde_json::from_value(json!({"action": "TOGGLE_INSPECTOR", "payload": true})).unwrap();
        assert_eq!(toggle, ExtensionMessage::ToggleInspector { payload: true });
    }

    #[test]
    fn bridge_control_uses_plain_action_field() {
        let msg = BridgeMessage::ControlAnimation {
            animation_id: "css-scroll-2".into(),
            action: AnimationAction::Restart,
            value: None,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "CONTROL_ANIMATION", "animationId": "css-scroll-2", "action": "restart"})
        );
    }

    #[test]
    fn detected_message_parses_raw_triggers() {
        let msg: BridgeMessage = serde_json::from_value(json!({
            "type": "SCROLL_ANIMATIONS_DETECTED",
            "animations": [{"element": "#hero", "scrub": 1, "tweenVars": ["y", "onUpdate"]}]
        }))
        .unwrap();
        let BridgeMessage::ScrollAnimationsDetected { animations } = msg else {
            panic!("wrong variant");
        };
        assert_eq!(animations[0].element.as_deref(), Some("#hero"));
        assert_eq!(animations[0].tween_vars, vec!["y", "onUpdate"]);
    }

    #[test]
    fn reply_prefers_error_arm() {
        let failed: Reply<InspectionData> =
            serde_json::from_value(json!({"error": "no tab"})).unwrap();
        assert_eq!(failed.into_result(), Err("no tab".to_string()));

        let ok: Reply<ScreenshotReply> =
            serde_json::from_value(json!({"dataUrl": "data:image/png;base64,AA=="})).unwrap();
        assert!(ok.into_result().is_ok());
    }

    #[test]
    fn prompt_request_treats_missing_fields_as_incomplete() {
        let req: GeneratePromptRequest = serde_json::from_value(json!({"image": "abc"})).unwrap();
        assert!(!req.is_complete());
        let body = serde_json::to_value(GeneratePromptRequest {
            image: "abc".into(),
            context: "<div/>".into(),
            timestamp: None,
        })
        .unwrap();
        assert!(body.get("timestamp").is_none());
    }

    #[test]
    fn animation_action_parses_cli_spellings() {
        assert_eq!("set-progress".parse::<AnimationAction>().unwrap(), AnimationAction::SetProgress);
        assert_eq!("scrollTo".parse::<AnimationAction>().unwrap(), AnimationAction::ScrollTo);
        assert!("rewind".parse::<AnimationAction>().is_err());
        assert!(AnimationAction::SetProgress.needs_value());
    }
}
