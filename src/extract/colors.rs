//! Color palette extraction and semantic role assignment.

use palette::{FromColor, Hsl as PaletteHsl, Srgb};
use std::collections::HashMap;

use super::{Extractor, ExtractorKind};
use crate::css;
use crate::types::{ColorRecord, ColorRole, ColorType, Document, Hsl, InspectionData};
use crate::Result;

/// Minimum hue distance, in degrees, between the primary and secondary colors.
pub const SECONDARY_HUE_GAP: f32 = 30.0;

pub struct ColorExtractor;

impl Extractor for ColorExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Colors
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.colors = extract_colors(doc);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ColorStats {
    total: usize,
    text: usize,
    background: usize,
    border: usize,
}

impl ColorStats {
    fn record(&mut self, kind: ColorType) {
        self.total += 1;
        match kind {
            ColorType::Text => self.text += 1,
            ColorType::Background => self.background += 1,
            ColorType::Border => self.border += 1,
        }
    }

    fn primary_type(&self) -> ColorType {
        if self.background > self.text && self.background > self.border {
            ColorType::Background
        } else if self.border > self.text && self.border > self.background {
            ColorType::Border
        } else {
            ColorType::Text
        }
    }
}

/// Collects every distinct text/background/border color, sorted by usage, with roles assigned.
pub fn extract_colors(doc: &Document<'_>) -> Vec<ColorRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, ColorStats> = HashMap::new();

    let mut process = |value: &str, kind: ColorType| {
        if css::is_transparent(value) {
            return;
        }
        let entry = stats.entry(value.to_string()).or_insert_with(|| {
            order.push(value.to_string());
            ColorStats::default()
        });
        entry.record(kind);
    };

    for node in doc.elements() {
        process(node.style("color"), ColorType::Text);
        process(node.style("background-color"), ColorType::Background);
        process(node.style("border-color"), ColorType::Border);
    }

    let mut colors: Vec<ColorRecord> = order
        .into_iter()
        .map(|raw| {
            let s = stats.get(&raw).copied().unwrap_or_default();
            ColorRecord {
                hex: css::to_hex(&raw),
                hsl: to_hsl(&raw),
                usage_count: s.total,
                color_type: s.primary_type(),
                role: None,
                rgba: raw,
            }
        })
        .collect();

    // Stable: equal counts keep first-seen order.
    colors.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
    assign_roles(&mut colors);
    colors
}

/// Assigns background, text, primary and secondary roles (each at most once).
///
/// `colors` must already be sorted by descending usage.
pub fn assign_roles(colors: &mut [ColorRecord]) {
    let background = colors
        .iter()
        .position(|c| c.color_type == ColorType::Background);
    let text = colors.iter().position(|c| c.color_type == ColorType::Text);

    if let Some(i) = background {
        colors[i].role = Some(ColorRole::Background);
    }
    if let Some(i) = text {
        colors[i].role = Some(ColorRole::Text);
    }

    let colorful = |c: &ColorRecord| c.hsl.s > 10.0 && c.hsl.l > 10.0 && c.hsl.l < 90.0;
    let taken = |i: usize| Some(i) == background || Some(i) == text;

    let Some(primary) = (0..colors.len()).find(|&i| colorful(&colors[i]) && !taken(i)) else {
        return;
    };
    colors[primary].role = Some(ColorRole::Primary);
    let primary_hue = colors[primary].hsl.h;

    let secondary = (0..colors.len()).find(|&i| {
        i != primary
            && !taken(i)
            && colorful(&colors[i])
            && (colors[i].hsl.h - primary_hue).abs() > SECONDARY_HUE_GAP
    });
    if let Some(i) = secondary {
        colors[i].role = Some(ColorRole::Secondary);
    }
}

/// Standard RGB to HSL conversion: hue in degrees, saturation and lightness in percent.
pub fn to_hsl(value: &str) -> Hsl {
    let Some([r, g, b]) = css::rgb_channels(value) else {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: 0.0,
        };
    };
    let rgb = Srgb::new(r, g, b).into_format::<f32>();
    let hsl: PaletteHsl = PaletteHsl::from_color(rgb);
    let hue = if hsl.saturation > 0.0 {
        hsl.hue.into_positive_degrees()
    } else {
        0.0
    };
    Hsl {
        h: hue,
        s: hsl.saturation * 100.0,
        l: hsl.lightness * 100.0,
    }
}
