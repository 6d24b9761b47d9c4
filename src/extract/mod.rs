//! Design extractors over a [`PageSnapshot`].
//!
//! Every extractor is an independent pass over the document. The runner
//! isolates failures: an extractor that errors is logged and contributes
//! nothing, the rest of the inspection carries on.

pub mod assets;
pub mod colors;
pub mod fonts;
pub mod red_flags;
pub mod scroll;
pub mod spacing;
pub mod tech;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::InspectError;
use crate::types::{Document, InspectionData, PageMeta, PageSnapshot};
use crate::Result;

pub use assets::{extract_assets, AssetExtractor};
pub use colors::{assign_roles, extract_colors, ColorExtractor};
pub use fonts::{extract_fonts, group_fonts_by_family, FontExtractor};
pub use red_flags::{detect_red_flags, RedFlagDetector};
pub use scroll::{detect_scroll_animations, gsap_records, ScrollAnimationDetector};
pub use spacing::{detect_spacing_system, spacing_summary, SpacingExtractor};
pub use tech::{extract_technologies, TechExtractor};

/// Computed properties the extractors and the detail card read.
/// A live snapshot must capture each of them.
pub const READ_PROPERTIES: &[&str] = &[
    "display",
    "visibility",
    "opacity",
    "position",
    "width",
    "height",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "text-decoration",
    "color",
    "background-color",
    "background-image",
    "border",
    "border-width",
    "border-color",
    "border-radius",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "box-shadow",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "fill",
    "object-fit",
    "animation-name",
    "animation-timeline",
    "animation-timing-function",
    "animation-duration",
    "animation-delay",
];

/// The kind of data an extractor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    Fonts,
    Colors,
    Spacing,
    Technologies,
    Assets,
    ScrollAnimations,
    RedFlags,
}

impl ExtractorKind {
    pub const fn all() -> [ExtractorKind; 7] {
        [
            ExtractorKind::Fonts,
            ExtractorKind::Colors,
            ExtractorKind::Spacing,
            ExtractorKind::Technologies,
            ExtractorKind::Assets,
            ExtractorKind::ScrollAnimations,
            ExtractorKind::RedFlags,
        ]
    }

    /// The extractors answering a GET_PAGE_DATA request.
    pub const fn page_data() -> [ExtractorKind; 5] {
        [
            ExtractorKind::Fonts,
            ExtractorKind::Colors,
            ExtractorKind::Spacing,
            ExtractorKind::Technologies,
            ExtractorKind::Assets,
        ]
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractorKind::Fonts => "fonts",
            ExtractorKind::Colors => "colors",
            ExtractorKind::Spacing => "spacing",
            ExtractorKind::Technologies => "technologies",
            ExtractorKind::Assets => "assets",
            ExtractorKind::ScrollAnimations => "scroll-animations",
            ExtractorKind::RedFlags => "red-flags",
        })
    }
}

impl FromStr for ExtractorKind {
    type Err = InspectError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fonts" | "typography" => Ok(ExtractorKind::Fonts),
            "colors" | "colours" => Ok(ExtractorKind::Colors),
            "spacing" => Ok(ExtractorKind::Spacing),
            "technologies" | "tech" => Ok(ExtractorKind::Technologies),
            "assets" => Ok(ExtractorKind::Assets),
            "scroll-animations" | "scroll" => Ok(ExtractorKind::ScrollAnimations),
            "red-flags" | "flags" => Ok(ExtractorKind::RedFlags),
            _ => Err(InspectError::Config(format!("Unknown extractor: {}", s))),
        }
    }
}

/// A single extraction pass.
pub trait Extractor: Send + Sync {
    fn kind(&self) -> ExtractorKind;

    /// Writes this extractor's findings into `out`.
    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()>;
}

/// All extractors in inspection order.
pub fn default_extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(FontExtractor),
        Box::new(ColorExtractor),
        Box::new(SpacingExtractor),
        Box::new(TechExtractor),
        Box::new(AssetExtractor),
        Box::new(ScrollAnimationDetector),
        Box::new(RedFlagDetector),
    ]
}

/// Runs the selected extractors; failures are logged and leave their field empty.
pub fn run_extractors(
    snapshot: &PageSnapshot,
    extractors: &[Box<dyn Extractor>],
    selected: &[ExtractorKind],
) -> InspectionData {
    let doc = snapshot.document();
    let mut data = InspectionData {
        meta: page_meta(&doc),
        ..InspectionData::default()
    };

    for extractor in extractors {
        let kind = extractor.kind();
        if !selected.contains(&kind) {
            continue;
        }
        let mut partial = InspectionData::default();
        match extractor.extract(&doc, &mut partial) {
            Ok(()) => {
                debug!(extractor = %kind, "extractor finished");
                merge(&mut data, partial, kind);
            }
            Err(err) => warn!(extractor = %kind, error = %err, "extractor failed; skipping"),
        }
    }

    data
}

/// Runs every extractor over the snapshot.
pub fn inspect_page(snapshot: &PageSnapshot) -> InspectionData {
    run_extractors(snapshot, &default_extractors(), &ExtractorKind::all())
}

/// Title, description and URL of the page.
pub fn page_meta(doc: &Document<'_>) -> PageMeta {
    let snapshot = doc.snapshot();
    let title = if snapshot.title.is_empty() {
        doc.first_by_tag("title")
            .map(|t| doc.text_content(t))
            .unwrap_or_default()
    } else {
        snapshot.title.clone()
    };
    PageMeta {
        title,
        description: doc
            .meta_content("name", "description")
            .unwrap_or_default()
            .to_string(),
        url: snapshot.url.clone(),
    }
}

fn merge(into: &mut InspectionData, from: InspectionData, kind: ExtractorKind) {
    match kind {
        ExtractorKind::Fonts => into.fonts = from.fonts,
        ExtractorKind::Colors => into.colors = from.colors,
        ExtractorKind::Spacing => into.spacing = from.spacing,
        ExtractorKind::Technologies => into.technologies = from.technologies,
        ExtractorKind::Assets => into.assets = from.assets,
        ExtractorKind::ScrollAnimations => into.scroll_animations = from.scroll_animations,
        ExtractorKind::RedFlags => into.red_flags = from.red_flags,
    }
}
