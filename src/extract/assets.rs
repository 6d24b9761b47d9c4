//! Downloadable assets: images, inline SVGs and CSS background images.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use super::{Extractor, ExtractorKind};
use crate::types::{AssetKind, AssetRecord, Document, InspectionData};
use crate::Result;

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(['"]?(.*?)['"]?\)"#).expect("valid css url regex")
});

/// Elements scanned for `background-image`.
const BACKGROUND_CANDIDATES: [&str; 7] = ["div", "section", "header", "footer", "a", "button", "span"];

/// Inline SVGs must be larger than this in both dimensions to count as an asset.
const MIN_SVG_SIZE: f32 = 10.0;

pub struct AssetExtractor;

impl Extractor for AssetExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Assets
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.assets = extract_assets(doc);
        Ok(())
    }
}

struct AssetCollector {
    base: Option<Url>,
    seen: HashSet<String>,
    assets: Vec<AssetRecord>,
}

impl AssetCollector {
    fn add(&mut self, kind: AssetKind, raw: &str, dimensions: Option<String>) {
        let resolved = match &self.base {
            Some(base) => base.join(raw),
            None => Url::parse(raw),
        };
        // Unresolvable URLs are dropped silently.
        let Ok(url) = resolved else {
            return;
        };
        let url = url.to_string();
        if !self.seen.insert(url.clone()) {
            return;
        }
        self.assets.push(AssetRecord {
            kind,
            url,
            dimensions,
        });
    }
}

/// Collects images, then inline SVGs, then background images; deduplicated by absolute URL.
pub fn extract_assets(doc: &Document<'_>) -> Vec<AssetRecord> {
    let mut collector = AssetCollector {
        base: Url::parse(doc.snapshot().base()).ok(),
        seen: HashSet::new(),
        assets: Vec::new(),
    };

    for img in doc.by_tag("img") {
        let Some(src) = img.attr("src").filter(|s| !s.is_empty()) else {
            continue;
        };
        let (w, h) = img
            .natural_size
            .map_or((0, 0), |size| (size.width, size.height));
        collector.add(AssetKind::Image, src, Some(format!("{w}x{h}")));
    }

    for svg in doc.by_tag("svg") {
        let rect = svg.bounding_box;
        if rect.width <= MIN_SVG_SIZE || rect.height <= MIN_SVG_SIZE {
            continue;
        }
        let Some(markup) = svg.markup.as_deref() else {
            continue;
        };
        let data_uri = format!("data:image/svg+xml;base64,{}", STANDARD.encode(markup));
        collector.add(
            AssetKind::Svg,
            &data_uri,
            Some(format!("{}x{}", rect.width.round(), rect.height.round())),
        );
    }

    for node in doc.by_tags(&BACKGROUND_CANDIDATES) {
        let background = node.style("background-image");
        if background.is_empty() || background == "none" || !background.starts_with("url(") {
            continue;
        }
        if let Some(url) = CSS_URL_RE
            .captures(background)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|u| !u.is_empty())
        {
            collector.add(AssetKind::Background, url, None);
        }
    }

    collector.assets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dom::fixtures::SnapshotBuilder;
    use crate::types::NaturalSize;

    #[test]
    fn images_resolve_against_base_and_dedup() {
        let mut b = SnapshotBuilder::new("https://example.com/blog/post");
        let first = b.push(Some(SnapshotBuilder::BODY), "img", &[("src", "/img/hero.png")]);
        b.node_mut(&first).natural_size = Some(NaturalSize {
            width: 1200,
            height: 630,
        });
        b.push(
            Some(SnapshotBuilder::BODY),
            "img",
            &[("src", "https://example.com/img/hero.png")],
        );
        b.push(Some(SnapshotBuilder::BODY), "img", &[("src", "")]);
        let snapshot = b.build();

        let assets = extract_assets(&snapshot.document());
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].kind, AssetKind::Image);
        assert_eq!(assets[0].url, "https://example.com/img/hero.png");
        assert_eq!(assets[0].dimensions.as_deref(), Some("1200x630"));
    }

    #[test]
    fn small_svgs_are_skipped_and_large_ones_inlined() {
        let mut b = SnapshotBuilder::new("https://example.com");
        let icon = b.push(Some(SnapshotBuilder::BODY), "svg", &[]);
        b.rect(&icon, 0.0, 0.0, 10.0, 24.0);
        b.node_mut(&icon).markup = Some("<svg/>".into());
        let logo = b.push(Some(SnapshotBuilder::BODY), "svg", &[]);
        b.rect(&logo, 0.0, 0.0, 120.4, 32.6);
        b.node_mut(&logo).markup = Some("<svg></svg>".into());
        let snapshot = b.build();

        let assets = extract_assets(&snapshot.document());
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].kind, AssetKind::Svg);
        assert_eq!(
            assets[0].url,
            format!("data:image/svg+xml;base64,{}", STANDARD.encode("<svg></svg>"))
        );
        assert_eq!(assets[0].dimensions.as_deref(), Some("120x33"));
    }

    #[test]
    fn background_images_come_from_candidate_tags_only() {
        let mut b = SnapshotBuilder::new("https://example.com/");
        let hero = b.push(Some(SnapshotBuilder::BODY), "section", &[]);
        b.style(&hero, &[("background-image", "url(\"https://cdn.example.com/bg.jpg\")")]);
        let article = b.push(Some(SnapshotBuilder::BODY), "article", &[]);
        b.style(&article, &[("background-image", "url(\"/skipped.jpg\")")]);
        let gradient = b.push(Some(SnapshotBuilder::BODY), "div", &[]);
        b.style(&gradient, &[("background-image", "linear-gradient(red, blue)")]);
        let snapshot = b.build();

        let assets = extract_assets(&snapshot.document());
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].kind, AssetKind::Background);
        assert_eq!(assets[0].url, "https://cdn.example.com/bg.jpg");
        assert_eq!(assets[0].dimensions, None);
    }
}
