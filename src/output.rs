use crate::error::ErrorPayload;
use crate::inspector::{DetailCard, Guide};
use crate::types::{
    InspectionData, RedFlag, ResourceKind, ScrollAnimationRecord, ScrollLibrary, Severity,
    SpacingSummary, Viewport,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema version for output payloads.
pub const OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DinspectOutput {
    Inspect(InspectOutput),
    Flags(FlagsOutput),
    Scroll(ScrollOutput),
    Element(ElementOutput),
    Enhance(EnhanceOutput),
    Capture(CaptureOutput),
    Prompt(PromptOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectOutput {
    pub version: String,
    pub source: ResourceDescriptor,
    #[serde(flatten)]
    pub data: InspectionData,
    /// `:root` custom properties for the palette, in the preferred color format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_css: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagsOutput {
    pub version: String,
    pub source: ResourceDescriptor,
    pub red_flags: Vec<RedFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<Severity>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSnippet {
    pub id: String,
    pub library: ScrollLibrary,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOutput {
    pub version: String,
    pub source: ResourceDescriptor,
    pub scroll_animations: Vec<ScrollAnimationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snippets: Vec<AnimationSnippet>,
    /// Set when a playback command was sent to the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementOutput {
    pub version: String,
    pub source: ResourceDescriptor,
    pub selector: String,
    pub tooltip: String,
    pub card: DetailCard,
    pub spacing: SpacingSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guides: Vec<Guide>,
    /// Component prompt with the styled markup of the element
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceOutput {
    pub version: String,
    pub source: ResourceDescriptor,
    pub selector: String,
    pub prompt: String,
    pub copied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutput {
    pub version: String,
    pub url: String,
    pub viewport: Viewport,
    pub output_path: PathBuf,
    pub nodes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptKind {
    /// React clone of the whole page
    Clone,
    /// Image-generation prompt
    Visual,
    /// Palette as CSS custom properties
    Palette,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOutput {
    pub version: String,
    pub source: ResourceDescriptor,
    pub kind: PromptKind,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub error: ErrorPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PageMeta, RedFlagCategory};

    fn source() -> ResourceDescriptor {
        ResourceDescriptor {
            kind: ResourceKind::Url,
            value: "https://example.com".to_string(),
        }
    }

    #[test]
    fn inspect_output_flattens_inspection_data() {
        let output = DinspectOutput::Inspect(InspectOutput {
            version: OUTPUT_VERSION.to_string(),
            source: source(),
            data: InspectionData {
                spacing: vec![8, 16],
                meta: PageMeta {
                    title: "Example".into(),
                    ..PageMeta::default()
                },
                ..InspectionData::default()
            },
            palette_css: None,
        });

        let json = serde_json::to_value(&output).expect("serialize inspect output");
        assert_eq!(json["mode"], "inspect");
        assert_eq!(json["spacing"], serde_json::json!([8, 16]));
        assert_eq!(json["meta"]["title"], "Example");
        assert!(json.get("paletteCss").is_none());
    }

    #[test]
    fn flags_output_serializes() {
        let output = DinspectOutput::Flags(FlagsOutput {
            version: OUTPUT_VERSION.to_string(),
            source: source(),
            red_flags: vec![RedFlag {
                id: "seo-missing-title".into(),
                category: RedFlagCategory::Seo,
                severity: Severity::Critical,
                title: "Missing page title".into(),
                description: String::new(),
                element: None,
                count: None,
                recommendation: String::new(),
            }],
            worst: Some(Severity::Critical),
            fail_on: Some(Severity::Warning),
            passed: false,
        });

        let json = serde_json::to_string(&output).expect("serialize flags output");
        assert!(json.contains("\"mode\":\"flags\""));
        assert!(json.contains("\"redFlags\":[{"));
        assert!(json.contains("\"failOn\":\"warning\""));
    }

    #[test]
    fn prompt_kind_is_kebab_case() {
        let output = DinspectOutput::Prompt(PromptOutput {
            version: OUTPUT_VERSION.to_string(),
            source: source(),
            kind: PromptKind::Visual,
            text: "/imagine prompt: ...".into(),
        });
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["mode"], "prompt");
        assert_eq!(json["kind"], "visual");
    }
}
