//! Result records produced by the extractors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One (family, weight, style) combination seen on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontRecord {
    pub family: String,
    pub source: FontSource,
    pub weight: String,
    pub style: String,
    pub size: String,
    pub line_height: String,
}

/// Where a font family is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    /// Requested through a Google Fonts stylesheet
    Google,
    /// A generic or platform family (`sans-serif`, `system-ui`, ...)
    System,
    Unknown,
}

/// Font records grouped by family, as shown in the typography panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFamilyGroup {
    pub family: String,
    pub source: FontSource,
    /// `"<weight> <style>"` variants in first-seen order
    pub variants: Vec<String>,
    /// Distinct sizes in first-seen order
    pub sizes: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    Text,
    Background,
    Border,
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorType::Text => "text",
            ColorType::Background => "background",
            ColorType::Border => "border",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Background,
    Text,
    Primary,
    Secondary,
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorRole::Background => "background",
            ColorRole::Text => "text",
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
        })
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// A distinct resolved color and how it is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRecord {
    pub hex: String,
    /// Raw resolved value (`rgb(...)` / `rgba(...)`)
    pub rgba: String,
    pub usage_count: usize,
    #[serde(rename = "type")]
    pub color_type: ColorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ColorRole>,
    pub hsl: Hsl,
}

/// Box metrics of a single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingSummary {
    pub margin: String,
    pub padding: String,
    pub width: String,
    pub height: String,
    pub position: String,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Svg,
    Background,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Absolute URL (or `data:` URI for inline SVG)
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollLibrary {
    GsapScrolltrigger,
    FramerMotion,
    Locomotive,
    Aos,
    IntersectionObserver,
    CssScrollTimeline,
}

impl ScrollLibrary {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollLibrary::GsapScrolltrigger => "gsap-scrolltrigger",
            ScrollLibrary::FramerMotion => "framer-motion",
            ScrollLibrary::Locomotive => "locomotive",
            ScrollLibrary::Aos => "aos",
            ScrollLibrary::IntersectionObserver => "intersection-observer",
            ScrollLibrary::CssScrollTimeline => "css-scroll-timeline",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScrollLibrary::GsapScrolltrigger => "GSAP ScrollTrigger",
            ScrollLibrary::FramerMotion => "Framer Motion",
            ScrollLibrary::Locomotive => "Locomotive Scroll",
            ScrollLibrary::Aos => "AOS",
            ScrollLibrary::IntersectionObserver => "Intersection Observer",
            ScrollLibrary::CssScrollTimeline => "CSS Scroll Timeline",
        }
    }
}

impl fmt::Display for ScrollLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GSAP `scrub` is either a flag or a smoothing duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scrub {
    Flag(bool),
    Smoothing(f64),
}

impl Default for Scrub {
    fn default() -> Self {
        Scrub::Flag(false)
    }
}

impl fmt::Display for Scrub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scrub::Flag(flag) => write!(f, "{flag}"),
            Scrub::Smoothing(seconds) => write!(f, "{seconds}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerInfo {
    pub element: String,
    pub start: String,
    pub end: String,
    pub scrub: Scrub,
    pub pin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_actions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Js,
    Css,
    Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationInfo {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub properties: Vec<String>,
    /// Milliseconds for CSS sources, seconds for GSAP tweens; `None` when unknown
    pub duration: Option<f64>,
    pub easing: String,
    pub delay: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollAnimationRecord {
    pub id: String,
    pub library: ScrollLibrary,
    pub element: String,
    pub trigger: TriggerInfo,
    pub animation: AnimationInfo,
    pub markers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_name: Option<String>,
}

/// Raw facts about one ScrollTrigger instance, as read in the page context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GsapTrigger {
    /// Selector of the trigger element, when it has one
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub scrub: Option<Scrub>,
    #[serde(default)]
    pub pin: bool,
    #[serde(default)]
    pub toggle_actions: Option<String>,
    #[serde(default)]
    pub markers: bool,
    #[serde(default)]
    pub ease: Option<String>,
    /// Keys of the attached tween's vars, callbacks included
    #[serde(default)]
    pub tween_vars: Vec<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub delay: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedFlagCategory {
    Seo,
    Ux,
    Accessibility,
    Mobile,
    Performance,
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        })
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("Unknown severity: {other} (expected info, warning or critical)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlag {
    pub id: String,
    pub category: RedFlagCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Everything gathered about one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionData {
    #[serde(default)]
    pub fonts: Vec<FontRecord>,
    #[serde(default)]
    pub colors: Vec<ColorRecord>,
    #[serde(default)]
    pub spacing: Vec<u32>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub scroll_animations: Vec<ScrollAnimationRecord>,
    #[serde(default)]
    pub red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl InspectionData {
    pub fn color_with_role(&self, role: ColorRole) -> Option<&ColorRecord> {
        self.colors.iter().find(|c| c.role == Some(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_accepts_flag_or_number() {
        let flag: Scrub = serde_json::from_str("true").unwrap();
        let smoothing: Scrub = serde_json::from_str("1.5").unwrap();
        assert_eq!(flag, Scrub::Flag(true));
        assert_eq!(smoothing, Scrub::Smoothing(1.5));
    }

    #[test]
    fn severity_orders_by_impact() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
    }

    #[test]
    fn color_record_uses_original_field_names() {
        let record = ColorRecord {
            hex: "#FFFFFF".into(),
            rgba: "rgb(255, 255, 255)".into(),
            usage_count: 3,
            color_type: ColorType::Background,
            role: Some(ColorRole::Background),
            hsl: Hsl {
                h: 0.0,
                s: 0.0,
                l: 100.0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["usageCount"], 3);
        assert_eq!(json["type"], "background");
        assert_eq!(json["role"], "background");
    }
}
