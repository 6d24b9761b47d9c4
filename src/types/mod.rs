//! Core data types shared by the extractors, inspector and outputs.
//!
//! - [`core`] - geometry and resource classification
//! - [`dom`] - page snapshots and the read-only [`Document`] view over them
//! - [`records`] - per-extractor result records

pub mod core;
pub mod dom;
pub mod records;

pub use self::core::{BoundingBox, NaturalSize, ResourceKind};
pub use self::dom::{ComputedStyle, Document, DomNode, PageSnapshot};
pub use self::records::{
    AnimationInfo, AnimationKind, AssetKind, AssetRecord, ColorRecord, ColorRole, ColorType,
    FontFamilyGroup, FontRecord, FontSource, GsapTrigger, Hsl, InspectionData, PageMeta, RedFlag,
    RedFlagCategory, Scrub, ScrollAnimationRecord, ScrollLibrary, Severity, SpacingSummary,
    TriggerInfo,
};
pub use crate::viewport::Viewport;
