//! Measurement guides between the selected element and the hovered one.

use serde::{Deserialize, Serialize};

use crate::types::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    Vertical,
    Horizontal,
}

/// A one-pixel line from `(x, y)` spanning `length` px along `axis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub axis: GuideAxis,
    pub x: f32,
    pub y: f32,
    /// Rounded distance in CSS pixels
    pub length: i64,
    pub label: String,
}

/// Vertical gap between the two boxes, plus how far the hovered box
/// overhangs the selected box's right edge.
pub fn measure(selected: &BoundingBox, hovered: &BoundingBox) -> Vec<Guide> {
    let mut guides = Vec::new();
    let center_x = selected.left() + selected.width / 2.0;

    if selected.bottom() < hovered.top() {
        let dist = (hovered.top() - selected.bottom()).round() as i64;
        guides.push(Guide {
            axis: GuideAxis::Vertical,
            x: center_x,
            y: selected.bottom(),
            length: dist,
            label: format!("{dist}px"),
        });
    } else if selected.top() > hovered.bottom() {
        let dist = (selected.top() - hovered.bottom()).round() as i64;
        guides.push(Guide {
            axis: GuideAxis::Vertical,
            x: center_x,
            y: hovered.bottom(),
            length: dist,
            label: format!("{dist}px"),
        });
    }

    if hovered.right() > selected.right() && hovered.left() < selected.right() {
        let dist = (hovered.right() - selected.right()).round() as i64;
        if dist > 0 {
            guides.push(Guide {
                axis: GuideAxis::Horizontal,
                x: selected.right(),
                y: selected.top() + selected.height / 2.0,
                length: dist,
                label: dist.to_string(),
            });
        }
    }

    guides
}
