//! Raw capture output and its conversion into [`PageSnapshot`].

use crate::types::{BoundingBox, ComputedStyle, DomNode, NaturalSize, PageSnapshot};
use crate::Viewport;
use std::collections::{BTreeMap, HashMap};

/// Page snapshot as returned by the capture function.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPageSnapshot {
    pub url: Option<String>,
    pub title: Option<String>,
    pub base_url: Option<String>,
    pub device_pixel_ratio: Option<f32>,
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub html_length: usize,
    pub body_text_length: Option<usize>,
    #[serde(default)]
    pub page_globals: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<RawDomNode>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDomNode {
    pub id: String,
    pub tag: String,
    #[serde(default)]
    pub children: Vec<String>,
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub text: Option<String>,
    pub bounding_box: RawBoundingBox,
    #[serde(default)]
    pub computed_style: BTreeMap<String, String>,
    pub natural_size: Option<NaturalSize>,
    pub markup: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawBoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Converts raw capture output into a [`PageSnapshot`].
///
/// `fallback_url` is used when the page did not report its own location.
pub(crate) fn convert_raw_snapshot(raw: RawPageSnapshot, fallback_url: &str) -> PageSnapshot {
    let nodes = raw
        .nodes
        .into_iter()
        .map(|node| DomNode {
            id: node.id,
            tag: node.tag.to_ascii_lowercase(),
            children: node.children,
            parent: node.parent,
            attributes: node.attributes,
            text: node.text,
            bounding_box: BoundingBox::new(
                node.bounding_box.x,
                node.bounding_box.y,
                node.bounding_box.width,
                node.bounding_box.height,
            ),
            computed_style: (!node.computed_style.is_empty())
                .then(|| ComputedStyle(node.computed_style)),
            natural_size: node.natural_size,
            markup: node.markup,
        })
        .collect();

    let mut snapshot = PageSnapshot::new(raw.url.unwrap_or_else(|| fallback_url.to_string()));
    snapshot.title = raw.title.unwrap_or_default();
    snapshot.base_url = raw.base_url;
    snapshot.device_pixel_ratio = raw.device_pixel_ratio.filter(|d| *d > 0.0).unwrap_or(1.0);
    snapshot.viewport = raw.viewport.unwrap_or_default();
    snapshot.html_length = raw.html_length;
    snapshot.body_text_length = raw.body_text_length;
    snapshot.page_globals = raw.page_globals;
    snapshot.nodes = nodes;
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"{
        "url": "https://example.com/",
        "title": "Example Page",
        "baseUrl": "https://example.com/",
        "devicePixelRatio": 2,
        "viewport": {"width": 1280, "height": 720},
        "htmlLength": 5120,
        "bodyTextLength": 830,
        "pageGlobals": ["gsap", "ScrollTrigger"],
        "nodes": [
            {"id": "n0", "tag": "HTML", "children": ["n1"], "parent": null,
             "boundingBox": {"x": 0, "y": 0, "width": 1280, "height": 2000},
             "computedStyle": {}},
            {"id": "n1", "tag": "img", "children": [], "parent": "n0",
             "attributes": {"src": "/hero.png"},
             "text": null,
             "boundingBox": {"x": 10, "y": 20, "width": 300, "height": 200},
             "computedStyle": {"display": "block", "font-family": "Inter, sans-serif"},
             "naturalSize": {"width": 1200, "height": 800}}
        ]
    }"#;

    #[test]
    fn raw_snapshot_converts_with_styles_and_metadata() {
        let raw: RawPageSnapshot = serde_json::from_str(RAW).unwrap();
        let snapshot = convert_raw_snapshot(raw, "https://fallback.test");

        assert_eq!(snapshot.url, "https://example.com/");
        assert_eq!(snapshot.device_pixel_ratio, 2.0);
        assert_eq!(snapshot.viewport.width, 1280);
        assert_eq!(snapshot.body_text_length, Some(830));
        assert!(snapshot.has_global("ScrollTrigger"));

        let html = &snapshot.nodes[0];
        assert_eq!(html.tag, "html");
        assert!(html.computed_style.is_none());

        let img = &snapshot.nodes[1];
        assert_eq!(img.style("font-family"), "Inter, sans-serif");
        assert_eq!(img.natural_size.map(|s| s.width), Some(1200));
        assert_eq!(img.bounding_box.height, 200.0);
    }

    #[test]
    fn missing_location_falls_back_to_requested_url() {
        let raw: RawPageSnapshot =
            serde_json::from_str(r#"{"devicePixelRatio": 0, "nodes": []}"#).unwrap();
        let snapshot = convert_raw_snapshot(raw, "https://fallback.test");
        assert_eq!(snapshot.url, "https://fallback.test");
        assert_eq!(snapshot.device_pixel_ratio, 1.0);
        assert!(snapshot.nodes.is_empty());
    }
}
