//! Session state: the last inspection, the inspector toggle, and display
//! preferences.
//!
//! State is passed around explicitly. Updates go through typed setters;
//! `set_data` and `set_preferences` merge partial patches over the current
//! values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InspectError;
use crate::types::{
    AssetRecord, ColorRecord, FontRecord, InspectionData, PageMeta, RedFlag, ScrollAnimationRecord,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    #[default]
    Hex,
    Rgb,
    Hsl,
}

impl ColorFormat {
    /// `color` rendered in this format. HSL components are rounded.
    pub fn display(self, color: &ColorRecord) -> String {
        match self {
            ColorFormat::Hex => color.hex.clone(),
            ColorFormat::Rgb => color.rgba.clone(),
            ColorFormat::Hsl => format!(
                "hsl({}, {}%, {}%)",
                color.hsl.h.round(),
                color.hsl.s.round(),
                color.hsl.l.round()
            ),
        }
    }
}

impl FromStr for ColorFormat {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(ColorFormat::Hex),
            "rgb" | "rgba" => Ok(ColorFormat::Rgb),
            "hsl" => Ok(ColorFormat::Hsl),
            other => Err(InspectError::Config(format!(
                "Unknown color format '{other}' (expected hex, rgb or hsl)"
            ))),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorFormat::Hex => "hex",
            ColorFormat::Rgb => "rgb",
            ColorFormat::Hsl => "hsl",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFormat {
    #[default]
    Px,
    Rem,
}

impl UnitFormat {
    /// A spacing token in this unit; rem assumes a 16px root.
    pub fn display(self, px: u32) -> String {
        match self {
            UnitFormat::Px => format!("{px}px"),
            UnitFormat::Rem => format!("{}rem", px as f64 / 16.0),
        }
    }
}

impl FromStr for UnitFormat {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" => Ok(UnitFormat::Px),
            "rem" => Ok(UnitFormat::Rem),
            other => Err(InspectError::Config(format!(
                "Unknown unit format '{other}' (expected px or rem)"
            ))),
        }
    }
}

impl fmt::Display for UnitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitFormat::Px => "px",
            UnitFormat::Rem => "rem",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    #[serde(alias = "color_format")]
    pub color_format: ColorFormat,
    #[serde(alias = "unit_format")]
    pub unit_format: UnitFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub color_format: Option<ColorFormat>,
    pub unit_format: Option<UnitFormat>,
}

/// Partial update of [`InspectionData`]; `None` fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionPatch {
    pub fonts: Option<Vec<FontRecord>>,
    pub colors: Option<Vec<ColorRecord>>,
    pub spacing: Option<Vec<u32>>,
    pub technologies: Option<Vec<String>>,
    pub assets: Option<Vec<AssetRecord>>,
    pub scroll_animations: Option<Vec<ScrollAnimationRecord>>,
    pub red_flags: Option<Vec<RedFlag>>,
    pub meta: Option<PageMeta>,
}

impl From<InspectionData> for InspectionPatch {
    fn from(data: InspectionData) -> Self {
        Self {
            fonts: Some(data.fonts),
            colors: Some(data.colors),
            spacing: Some(data.spacing),
            technologies: Some(data.technologies),
            assets: Some(data.assets),
            scroll_animations: Some(data.scroll_animations),
            red_flags: Some(data.red_flags),
            meta: Some(data.meta),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionStore {
    inspecting: bool,
    data: InspectionData,
    preferences: Preferences,
}

impl InspectionStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    pub fn is_inspecting(&self) -> bool {
        self.inspecting
    }

    pub fn data(&self) -> &InspectionData {
        &self.data
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_inspecting(&mut self, inspecting: bool) {
        self.inspecting = inspecting;
    }

    pub fn set_data(&mut self, patch: impl Into<InspectionPatch>) {
        let patch = patch.into();
        let data = &mut self.data;
        if let Some(fonts) = patch.fonts {
            data.fonts = fonts;
        }
        if let Some(colors) = patch.colors {
            data.colors = colors;
        }
        if let Some(spacing) = patch.spacing {
            data.spacing = spacing;
        }
        if let Some(technologies) = patch.technologies {
            data.technologies = technologies;
        }
        if let Some(assets) = patch.assets {
            data.assets = assets;
        }
        if let Some(scroll_animations) = patch.scroll_animations {
            data.scroll_animations = scroll_animations;
        }
        if let Some(red_flags) = patch.red_flags {
            data.red_flags = red_flags;
        }
        if let Some(meta) = patch.meta {
            data.meta = meta;
        }
    }

    pub fn set_preferences(&mut self, patch: PreferencesPatch) {
        if let Some(color_format) = patch.color_format {
            self.preferences.color_format = color_format;
        }
        if let Some(unit_format) = patch.unit_format {
            self.preferences.unit_format = unit_format;
        }
    }

    /// Clears the data and the inspector toggle. Preferences survive.
    pub fn reset(&mut self) {
        self.data = InspectionData::default();
        self.inspecting = false;
    }

    /// The palette as CSS custom properties in the preferred color format.
    pub fn palette_css(&self) -> String {
        palette_css(&self.data.colors, self.preferences.color_format)
    }
}

/// `:root { --color-N: value; /* type */ }` for every color, 1-based.
pub fn palette_css(colors: &[ColorRecord], format: ColorFormat) -> String {
    let lines: Vec<String> = colors
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "  --color-{}: {}; /* {} */",
                i + 1,
                format.display(c),
                c.color_type
            )
        })
        .collect();
    format!(":root {{\n{}\n}}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorType, Hsl};

    fn color(hex: &str, rgba: &str, color_type: ColorType) -> ColorRecord {
        ColorRecord {
            hex: hex.to_string(),
            rgba: rgba.to_string(),
            usage_count: 1,
            color_type,
            role: None,
            hsl: Hsl {
                h: 217.2,
                s: 91.2,
                l: 59.8,
            },
        }
    }

    #[test]
    fn set_data_merges_partial_patches() {
        let mut store = InspectionStore::default();
        store.set_data(InspectionPatch {
            spacing: Some(vec![8, 16]),
            technologies: Some(vec!["React".into()]),
            ..InspectionPatch::default()
        });
        store.set_data(InspectionPatch {
            spacing: Some(vec![4]),
            ..InspectionPatch::default()
        });
        assert_eq!(store.data().spacing, vec![4]);
        assert_eq!(store.data().technologies, vec!["React".to_string()]);
    }

    #[test]
    fn reset_keeps_preferences() {
        let mut store = InspectionStore::default();
        store.set_inspecting(true);
        store.set_preferences(PreferencesPatch {
            color_format: Some(ColorFormat::Hsl),
            ..PreferencesPatch::default()
        });
        store.set_data(InspectionPatch {
            spacing: Some(vec![8]),
            ..InspectionPatch::default()
        });

        store.reset();
        assert!(!store.is_inspecting());
        assert!(store.data().spacing.is_empty());
        assert_eq!(store.preferences().color_format, ColorFormat::Hsl);
        assert_eq!(store.preferences().unit_format, UnitFormat::Px);
    }

    #[test]
    fn formats_follow_preferences() {
        let c = color("#3B82F6", "rgb(59, 130, 246)", ColorType::Background);
        assert_eq!(ColorFormat::Hex.display(&c), "#3B82F6");
        assert_eq!(ColorFormat::Rgb.display(&c), "rgb(59, 130, 246)");
        assert_eq!(ColorFormat::Hsl.display(&c), "hsl(217, 91%, 60%)");
        assert_eq!(UnitFormat::Px.display(24), "24px");
        assert_eq!(UnitFormat::Rem.display(24), "1.5rem");
        assert_eq!("REM".parse::<UnitFormat>().unwrap(), UnitFormat::Rem);
        assert!("em".parse::<UnitFormat>().is_err());
    }

    #[test]
    fn palette_css_numbers_colors_from_one() {
        let colors = vec![
            color("#FFFFFF", "rgb(255, 255, 255)", ColorType::Background),
            color("#111827", "rgb(17, 24, 39)", ColorType::Text),
        ];
        assert_eq!(
            palette_css(&colors, ColorFormat::Hex),
            ":root {\n  --color-1: #FFFFFF; /* background */\n  --color-2: #111827; /* text */\n}"
        );
    }
}
