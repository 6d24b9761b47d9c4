//! Page snapshots captured from the browser.
//!
//! A [`PageSnapshot`] is the flattened element tree of one rendered page
//! (head included) with resolved computed styles. Extractors never touch
//! it directly; they read through a [`Document`], which indexes the nodes
//! once and offers the handful of queries the extractors need.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::core::{BoundingBox, NaturalSize};
use super::records::GsapTrigger;
use crate::css;
use crate::viewport::Viewport;

fn default_device_pixel_ratio() -> f32 {
    1.0
}

/// A snapshot of a rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// The URL of the captured page (`window.location.href`)
    pub url: String,
    /// The document title
    #[serde(default)]
    pub title: String,
    /// `document.baseURI`, used to resolve relative asset URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f32,
    #[serde(default)]
    pub viewport: Viewport,
    /// Length of `documentElement.outerHTML`
    #[serde(default)]
    pub html_length: usize,
    /// Length of the whitespace-collapsed body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text_length: Option<usize>,
    /// Names of probed page globals that exist (`ScrollTrigger`, `gsap`, `ScrollMagic`, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_globals: Vec<String>,
    /// ScrollTrigger instances reported by the page-context script
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gsap_triggers: Vec<GsapTrigger>,
    /// Flattened element list
    #[serde(default)]
    pub nodes: Vec<DomNode>,
}

impl PageSnapshot {
    /// Creates an empty snapshot for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            base_url: None,
            device_pixel_ratio: 1.0,
            viewport: Viewport::default(),
            html_length: 0,
            body_text_length: None,
            page_globals: Vec::new(),
            gsap_triggers: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.page_globals.iter().any(|g| g == name)
    }

    /// Base for resolving relative URLs: `baseURI` when known, else the page URL.
    pub fn base(&self) -> &str {
        self.base_url.as_deref().unwrap_or(&self.url)
    }

    pub fn document(&self) -> Document<'_> {
        Document::new(self)
    }
}

/// A single element with its properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    /// Unique identifier for this node
    pub id: String,
    /// Lowercase tag name (e.g., "div", "svg", "meta")
    pub tag: String,
    /// IDs of child elements, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// ID of the parent element
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    /// Direct text content (own text nodes, trimmed and space-joined); full text for scripts
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_style: Option<ComputedStyle>,
    /// Intrinsic size for images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_size: Option<NaturalSize>,
    /// Serialized markup for inline SVG roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

impl DomNode {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            children: Vec::new(),
            parent: None,
            attributes: HashMap::new(),
            text: None,
            bounding_box: BoundingBox::default(),
            computed_style: None,
            natural_size: None,
            markup: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn element_id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Whitespace-separated class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// A computed style property, `""` when missing.
    pub fn style(&self, property: &str) -> &str {
        self.computed_style
            .as_ref()
            .and_then(|s| s.get(property))
            .unwrap_or("")
    }
}

/// Resolved CSS properties keyed by their kebab-case names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedStyle(pub BTreeMap<String, String>);

impl ComputedStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    /// Leading numeric value of a property (`parseFloat` semantics).
    pub fn number(&self, property: &str) -> Option<f64> {
        self.get(property).and_then(css::parse_float)
    }

    /// Leading integer value of a property (`parseInt` semantics).
    pub fn integer(&self, property: &str) -> Option<i64> {
        self.get(property).and_then(css::parse_int)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Indexed, read-only view over a snapshot.
pub struct Document<'a> {
    snapshot: &'a PageSnapshot,
    by_id: HashMap<&'a str, usize>,
    order: Vec<usize>,
}

impl<'a> Document<'a> {
    pub fn new(snapshot: &'a PageSnapshot) -> Self {
        let by_id: HashMap<&str, usize> = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        // Pre-order walk from the roots so queries see document order even when
        // the capture emitted nodes in another order.
        let mut order = Vec::with_capacity(snapshot.nodes.len());
        let mut visited = vec![false; snapshot.nodes.len()];
        let roots = snapshot.nodes.iter().enumerate().filter(|(_, n)| {
            n.parent
                .as_deref()
                .map_or(true, |p| !by_id.contains_key(p))
        });
        for (root, _) in roots {
            let mut stack = vec![root];
            while let Some(idx) = stack.pop() {
                if visited[idx] {
                    continue;
                }
                visited[idx] = true;
                order.push(idx);
                for child in snapshot.nodes[idx].children.iter().rev() {
                    if let Some(&c) = by_id.get(child.as_str()) {
                        stack.push(c);
                    }
                }
            }
        }

        Self {
            snapshot,
            by_id,
            order,
        }
    }

    pub fn snapshot(&self) -> &'a PageSnapshot {
        self.snapshot
    }

    pub fn url(&self) -> &'a str {
        &self.snapshot.url
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&'a DomNode> {
        let snapshot: &'a PageSnapshot = self.snapshot;
        self.by_id.get(id).map(|&i| &snapshot.nodes[i])
    }

    /// Every element in document order (`querySelectorAll('*')`).
    pub fn elements(&self) -> impl Iterator<Item = &'a DomNode> + '_ {
        let snapshot: &'a PageSnapshot = self.snapshot;
        self.order.iter().map(move |&i| &snapshot.nodes[i])
    }

    pub fn by_tag<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'a DomNode> + 's {
        self.elements().filter(move |n| n.is(tag))
    }

    pub fn by_tags<'s>(&'s self, tags: &'s [&'s str]) -> impl Iterator<Item = &'a DomNode> + 's {
        self.elements()
            .filter(move |n| tags.iter().any(|t| n.is(t)))
    }

    pub fn first_by_tag(&self, tag: &str) -> Option<&'a DomNode> {
        self.elements().find(|n| n.is(tag))
    }

    /// First `<meta>` whose `attribute` equals `value` (e.g. `name="description"`).
    pub fn meta(&self, attribute: &str, value: &str) -> Option<&'a DomNode> {
        self.by_tag("meta")
            .find(|n| n.attr(attribute) == Some(value))
    }

    pub fn meta_content(&self, attribute: &str, value: &str) -> Option<&'a str> {
        self.meta(attribute, value).and_then(|n| n.attr("content"))
    }

    /// `<link>` elements whose `rel` attribute equals `rel`.
    pub fn links_with_rel<'s>(&'s self, rel: &'s str) -> impl Iterator<Item = &'a DomNode> + 's {
        self.by_tag("link")
            .filter(move |n| n.attr("rel") == Some(rel))
    }

    pub fn element_by_id(&self, id: &str) -> Option<&'a DomNode> {
        self.elements().find(|n| n.element_id() == Some(id))
    }

    pub fn root(&self) -> Option<&'a DomNode> {
        self.first_by_tag("html").or_else(|| self.elements().next())
    }

    pub fn body(&self) -> Option<&'a DomNode> {
        self.first_by_tag("body")
    }

    pub fn parent(&self, node: &DomNode) -> Option<&'a DomNode> {
        node.parent.as_deref().and_then(|p| self.node(p))
    }

    pub fn children<'s>(&'s self, node: &'s DomNode) -> impl Iterator<Item = &'a DomNode> + 's {
        node.children.iter().filter_map(move |c| self.node(c))
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self, node: &DomNode) -> Vec<&'a DomNode> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(p) = current {
            if out.len() > self.snapshot.nodes.len() {
                break;
            }
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Whether `node` sits under an element with the given tag (`closest(tag)` minus self).
    pub fn has_ancestor(&self, node: &DomNode, tag: &str) -> bool {
        self.ancestors(node).iter().any(|a| a.is(tag))
    }

    /// Whether `node` lives inside `<head>`.
    pub fn in_head(&self, node: &DomNode) -> bool {
        self.has_ancestor(node, "head")
    }

    /// Concatenated text of a subtree, like `textContent` with whitespace collapsed.
    pub fn text_content(&self, node: &DomNode) -> String {
        let mut parts: Vec<&str> = Vec::new();
        self.collect_text(node, &mut parts, 0);
        parts.join(" ")
    }

    fn collect_text<'n>(&'n self, node: &'n DomNode, parts: &mut Vec<&'n str>, depth: usize) {
        if depth > 256 {
            return;
        }
        if let Some(text) = node.text.as_deref() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        for child in node.children.iter().filter_map(|c| self.node(c)) {
            self.collect_text(child, parts, depth + 1);
        }
    }

    /// Short selector for an element: `#id`, `.first.second` classes, or `tag:nth-of-type(n)`.
    pub fn element_selector(&self, node: &DomNode) -> String {
        if let Some(id) = node.element_id() {
            return format!("#{id}");
        }
        let classes: Vec<&str> = node.classes().take(2).collect();
        if !classes.is_empty() {
            return format!(".{}", classes.join("."));
        }
        let tag = node.tag.to_ascii_lowercase();
        match self.parent(node) {
            Some(parent) => {
                let position = self
                    .children(parent)
                    .filter(|c| c.tag.eq_ignore_ascii_case(&node.tag))
                    .position(|c| c.id == node.id)
                    .map_or(0, |p| p + 1);
                format!("{tag}:nth-of-type({position})")
            }
            None => tag,
        }
    }

    /// Resolves a simple selector (`#id`, `.class`, `tag`, `tag.class`,
    /// `tag:nth-of-type(n)`, `[attr]`, `[attr="value"]`) to the first match.
    pub fn select(&self, selector: &str) -> Option<&'a DomNode> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        self.elements().find(|n| self.matches(n, selector))
    }

    fn matches(&self, node: &DomNode, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return node.element_id() == Some(id);
        }
        if let Some(inner) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return match inner.split_once('=') {
                Some((name, value)) => {
                    node.attr(name.trim()) == Some(value.trim().trim_matches(['"', '\'']))
                }
                None => node.has_attr(inner.trim()),
            };
        }
        if let Some((tag, rest)) = selector.split_once(":nth-of-type(") {
            let Some(n) = rest.strip_suffix(')').and_then(|n| n.trim().parse::<usize>().ok())
            else {
                return false;
            };
            if !node.is(tag) {
                return false;
            }
            return self.element_selector_position(node) == Some(n);
        }
        let mut pieces = selector.split('.');
        let tag = pieces.next().unwrap_or("");
        if !tag.is_empty() && !node.is(tag) {
            return false;
        }
        pieces.all(|class| node.has_class(class))
    }

    fn element_selector_position(&self, node: &DomNode) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent)
            .filter(|c| c.tag.eq_ignore_ascii_case(&node.tag))
            .position(|c| c.id == node.id)
            .map(|p| p + 1)
    }

    /// Topmost-painted element whose box contains the point (deepest match wins).
    pub fn element_at(&self, x: f32, y: f32) -> Option<&'a DomNode> {
        self.elements()
            .filter(|n| !n.is("html") && !self.in_head(n) && !n.is("head"))
            .filter(|n| n.bounding_box.area() > 0.0 && n.bounding_box.contains(x, y))
            .last()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small builder used by unit tests across the crate.

    use super::*;

    pub struct SnapshotBuilder {
        snapshot: PageSnapshot,
        next: usize,
    }

    impl SnapshotBuilder {
        /// Starts a document with `<html>`, `<head>` and `<body>`.
        pub fn new(url: &str) -> Self {
            let mut snapshot = PageSnapshot::new(url);
            snapshot.html_length = 10_000;
            let mut builder = Self { snapshot, next: 0 };
            builder.push(None, "html", &[]);
            builder.push(Some("n0"), "head", &[]);
            builder.push(Some("n0"), "body", &[]);
            builder
        }

        pub const HTML: &'static str = "n0";
        pub const HEAD: &'static str = "n1";
        pub const BODY: &'static str = "n2";

        /// Appends an element under `parent` and returns its id.
        pub fn push(&mut self, parent: Option<&str>, tag: &str, attrs: &[(&str, &str)]) -> String {
            let id = format!("n{}", self.next);
            self.next += 1;
            let mut node = DomNode::new(id.clone(), tag);
            node.parent = parent.map(str::to_string);
            node.attributes = attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            if let Some(parent_id) = parent {
                if let Some(p) = self.snapshot.nodes.iter_mut().find(|n| n.id == parent_id) {
                    p.children.push(id.clone());
                }
            }
            self.snapshot.nodes.push(node);
            id
        }

        pub fn node_mut(&mut self, id: &str) -> &mut DomNode {
            self.snapshot
                .nodes
                .iter_mut()
                .find(|n| n.id == id)
                .expect("node exists")
        }

        pub fn text(&mut self, id: &str, text: &str) -> &mut Self {
            self.node_mut(id).text = Some(text.to_string());
            self
        }

        pub fn style(&mut self, id: &str, props: &[(&str, &str)]) -> &mut Self {
            let node = self.node_mut(id);
            let style = node.computed_style.get_or_insert_with(ComputedStyle::default);
            for (k, v) in props {
                style.set(*k, *v);
            }
            self
        }

        pub fn rect(&mut self, id: &str, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
            self.node_mut(id).bounding_box = BoundingBox::new(x, y, w, h);
            self
        }

        pub fn snapshot_mut(&mut self) -> &mut PageSnapshot {
            &mut self.snapshot
        }

        pub fn build(&self) -> PageSnapshot {
            self.snapshot.clone()
        }
    }
}
