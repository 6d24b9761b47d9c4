//! Font usage: one record per (family, weight, style), in first-seen order.

use std::collections::HashSet;
use url::Url;

use super::{Extractor, ExtractorKind};
use crate::types::{Document, FontFamilyGroup, FontRecord, FontSource, InspectionData};
use crate::Result;

const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "-apple-system",
    "blinkmacsystemfont",
    "segoe ui",
    "helvetica",
    "helvetica neue",
    "arial",
    "times new roman",
    "times",
    "courier new",
    "georgia",
];

pub struct FontExtractor;

impl Extractor for FontExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Fonts
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.fonts = extract_fonts(doc);
        Ok(())
    }
}

/// Primary family of a `font-family` list, with quotes stripped.
pub fn primary_family(font_family: &str) -> String {
    font_family
        .split(',')
        .next()
        .unwrap_or("")
        .replace(['"', '\''], "")
        .trim()
        .to_string()
}

pub fn extract_fonts(doc: &Document<'_>) -> Vec<FontRecord> {
    let google = google_font_families(doc);
    let mut seen = HashSet::new();
    let mut fonts = Vec::new();

    for node in doc.elements() {
        let Some(style) = node.computed_style.as_ref() else {
            continue;
        };
        let family = primary_family(style.get("font-family").unwrap_or(""));
        if family.is_empty() {
            continue;
        }
        let weight = style.get("font-weight").unwrap_or("").to_string();
        let font_style = style.get("font-style").unwrap_or("").to_string();

        let key = format!("{}-{}-{}", family, weight, font_style);
        if !seen.insert(key) {
            continue;
        }

        fonts.push(FontRecord {
            source: font_source(&family, &google),
            family,
            weight,
            style: font_style,
            size: style.get("font-size").unwrap_or("").to_string(),
            line_height: style.get("line-height").unwrap_or("").to_string(),
        });
    }

    fonts
}

/// Groups records by family, keeping the order families were first seen.
pub fn group_fonts_by_family(fonts: &[FontRecord]) -> Vec<FontFamilyGroup> {
    let mut groups: Vec<FontFamilyGroup> = Vec::new();
    for font in fonts {
        let variant = format!("{} {}", font.weight, font.style);
        match groups.iter_mut().find(|g| g.family == font.family) {
            Some(group) => {
                group.count += 1;
                if !group.variants.contains(&variant) {
                    group.variants.push(variant);
                }
                if !group.sizes.contains(&font.size) {
                    group.sizes.push(font.size.clone());
                }
            }
            None => groups.push(FontFamilyGroup {
                family: font.family.clone(),
                source: font.source,
                variants: vec![variant],
                sizes: vec![font.size.clone()],
                count: 1,
            }),
        }
    }
    groups
}

fn font_source(family: &str, google: &HashSet<String>) -> FontSource {
    let lower = family.to_ascii_lowercase();
    if google.contains(&lower) {
        FontSource::Google
    } else if GENERIC_FAMILIES.contains(&lower.as_str()) {
        FontSource::System
    } else {
        FontSource::Unknown
    }
}

/// Lowercased family names requested from Google Fonts stylesheets.
fn google_font_families(doc: &Document<'_>) -> HashSet<String> {
    let mut families = HashSet::new();
    for link in doc.by_tag("link") {
        let Some(href) = link.attr("href") else {
            continue;
        };
        if !href.contains("fonts.googleapis.com") {
            continue;
        }
        let Ok(url) = Url::parse(doc.snapshot().base()).and_then(|base| base.join(href)) else {
            continue;
        };
        for (key, value) in url.query_pairs() {
            if key != "family" {
                continue;
            }
            for family in value.split('|') {
                let name = family.split(':').next().unwrap_or("").trim();
                if !name.is_empty() {
                    families.insert(name.to_ascii_lowercase());
                }
            }
        }
    }
    families
}
