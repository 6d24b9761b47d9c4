//! Spacing scale detection.

use std::collections::BTreeSet;

use super::{Extractor, ExtractorKind};
use crate::types::{Document, DomNode, InspectionData, SpacingSummary};
use crate::Result;

const SIDES: [&str; 8] = [
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
];

pub struct SpacingExtractor;

impl Extractor for SpacingExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Spacing
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.spacing = detect_spacing_system(doc);
        Ok(())
    }
}

/// Distinct positive integer padding and margin values across the page, ascending.
pub fn detect_spacing_system(doc: &Document<'_>) -> Vec<u32> {
    let mut values = BTreeSet::new();
    for node in doc.elements() {
        let Some(style) = node.computed_style.as_ref() else {
            continue;
        };
        for side in SIDES {
            if let Some(v) = style.integer(side) {
                if v > 0 {
                    values.insert(u32::try_from(v).unwrap_or(u32::MAX));
                }
            }
        }
    }
    values.into_iter().collect()
}

/// Box metrics of one element, as shown in the inspector card.
pub fn spacing_summary(node: &DomNode) -> SpacingSummary {
    let four = |prefix: &str| {
        ["top", "right", "bottom", "left"]
            .iter()
            .map(|side| node.style(&format!("{prefix}-{side}")).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    SpacingSummary {
        margin: four("margin"),
        padding: four("padding"),
        width: node.style("width").to_string(),
        height: node.style("height").to_string(),
        position: node.style("position").to_string(),
        display: node.style("display").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dom::fixtures::SnapshotBuilder;

    #[test]
    fn collects_distinct_positive_values() {
        let mut b = SnapshotBuilder::new("https://example.com");
        let a = b.push(Some(SnapshotBuilder::BODY), "div", &[]);
        let c = b.push(Some(SnapshotBuilder::BODY), "div", &[]);
        b.style(&a, &[("padding-top", "8px"), ("margin-left", "16px"), ("margin-top", "0px")]);
        b.style(
            &c,
            &[("padding-left", "16.7px"), ("margin-bottom", "24px"), ("margin-right", "auto")],
        );
        let snapshot = b.build();

        assert_eq!(detect_spacing_system(&snapshot.document()), vec![8, 16, 24]);
    }

    #[test]
    fn negative_margins_are_ignored() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.style(SnapshotBuilder::BODY, &[("margin-top", "-12px")]);
        let snapshot = b.build();
        assert!(detect_spacing_system(&snapshot.document()).is_empty());
    }

    #[test]
    fn summary_lists_sides_clockwise() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.style(
            SnapshotBuilder::BODY,
            &[
                ("margin-top", "1px"),
                ("margin-right", "2px"),
                ("margin-bottom", "3px"),
                ("margin-left", "4px"),
                ("padding-top", "0px"),
                ("padding-right", "0px"),
                ("padding-bottom", "0px"),
                ("padding-left", "0px"),
                ("width", "1440px"),
                ("display", "block"),
            ],
        );
        let snapshot = b.build();
        let summary = spacing_summary(snapshot.document().body().unwrap());
        assert_eq!(summary.margin, "1px 2px 3px 4px");
        assert_eq!(summary.padding, "0px 0px 0px 0px");
        assert_eq!(summary.width, "1440px");
        assert_eq!(summary.display, "block");
    }
}
