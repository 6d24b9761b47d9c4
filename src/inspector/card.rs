//! The detail card shown for a selected element, and its copyable CSS.

use serde::{Deserialize, Serialize};

use crate::css;
use crate::extract::fonts::primary_family;
use crate::types::DomNode;

const NO_BORDER: &str = "0px none rgb(0, 0, 0)";

/// Integer widths of the four sides, clockwise from the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
}

impl Sides {
    fn read(node: &DomNode, prefix: &str, suffix: &str) -> Self {
        let side = |name: &str| {
            css::parse_int(node.style(&format!("{prefix}-{name}{suffix}"))).unwrap_or(0)
        };
        Self {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxModel {
    pub margin: Sides,
    pub border: Sides,
    pub padding: Sides,
    /// Rounded content width
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    /// First family of the stack, quotes stripped
    pub family: String,
    pub weight: String,
    /// Rounded font size in px
    pub size: i64,
    pub line_height: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardColors {
    /// `#RRGGBB`
    pub text: String,
    /// Hex, `Gradient`, or `None` for a transparent background
    pub background: String,
}

/// Border, radius and shadow; `None` when the element has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<String>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.border.is_none() && self.radius.is_none() && self.shadow.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailCard {
    pub tag: String,
    pub box_model: BoxModel,
    pub typography: Typography,
    pub colors: CardColors,
    pub effects: Effects,
    /// Copy-ready CSS declarations
    pub css: String,
}

impl DetailCard {
    pub fn from_node(node: &DomNode) -> Self {
        let rect = node.bounding_box;
        let tag = node.tag.to_ascii_lowercase();
        let background_image = node.style("background-image");
        let gradient = background_image != "none" && background_image.contains("gradient");
        let background_color = node.style("background-color");

        let background = if gradient {
            "Gradient".to_string()
        } else if css::is_transparent(background_color) {
            "None".to_string()
        } else {
            css::to_hex(background_color)
        };

        let effects = effects(node);
        let css_text = copy_css(node, &tag, gradient, &effects);

        Self {
            box_model: BoxModel {
                margin: Sides::read(node, "margin", ""),
                border: Sides::read(node, "border", "-width"),
                padding: Sides::read(node, "padding", ""),
                width: rect.width.round() as i64,
                height: rect.height.round() as i64,
            },
            typography: Typography {
                family: primary_family(node.style("font-family")),
                weight: node.style("font-weight").to_string(),
                size: css::parse_float(node.style("font-size")).map_or(0, |s| s.round() as i64),
                line_height: node.style("line-height").to_string(),
            },
            colors: CardColors {
                text: css::to_hex(node.style("color")),
                background,
            },
            effects,
            css: css_text,
            tag,
        }
    }
}

fn effects(node: &DomNode) -> Effects {
    let border = node.style("border");
    let radius = node.style("border-radius");
    let shadow = node.style("box-shadow");
    Effects {
        border: (!border.is_empty() && border != NO_BORDER && node.style("border-width") != "0px")
            .then(|| border.to_string()),
        radius: (!radius.is_empty() && radius != "0px").then(|| radius.to_string()),
        shadow: (!shadow.is_empty() && shadow != "none").then(|| shadow.to_string()),
    }
}

fn copy_css(node: &DomNode, tag: &str, gradient: bool, effects: &Effects) -> String {
    let rect = node.bounding_box;
    let background = if gradient {
        node.style("background-image")
    } else {
        node.style("background-color")
    };
    [
        format!("/* {tag} styles */"),
        format!("font-family: {};", node.style("font-family")),
        format!("font-size: {};", node.style("font-size")),
        format!("font-weight: {};", node.style("font-weight")),
        format!("line-height: {};", node.style("line-height")),
        format!("color: {};", node.style("color")),
        format!("background: {background};"),
        format!("border: {};", effects.border.as_deref().unwrap_or("None")),
        format!("border-radius: {};", effects.radius.as_deref().unwrap_or("0")),
        format!("box-shadow: {};", effects.shadow.as_deref().unwrap_or("None")),
        format!("padding: {};", node.style("padding")),
        format!("margin: {};", node.style("margin")),
        format!("width: {}px;", rect.width),
        format!("height: {}px;", rect.height),
        String::new(),
    ]
    .join("\n")
}

/// Hover tooltip text: `tag.firstClass | W × H`.
pub fn tooltip(node: &DomNode) -> String {
    let class = node.classes().next().map(|c| format!(".{c}")).unwrap_or_default();
    format!(
        "{}{} | {} × {}",
        node.tag.to_ascii_lowercase(),
        class,
        node.bounding_box.width.round() as i64,
        node.bounding_box.height.round() as i64
    )
}
