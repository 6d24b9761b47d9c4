//! Visual inspector: hover, select, measure and describe elements.
//!
//! The inspector is a small state machine driven by pointer events:
//!
//! ```text
//! Idle --enable--> Hovering --click--> Selected --deselect--> Hovering
//!   ^                  |                   |
//!   +--disable/close---+-------------------+
//! ```
//!
//! In hover mode every pointer move selects the element under the pointer.
//! While an element is selected and another one is hovered, [`InspectorView`]
//! carries measurement guides between the two.

pub mod card;
pub mod enhance;
pub mod guides;
pub mod serialize;

use serde::Serialize;

use crate::types::Document;

pub use card::{tooltip, DetailCard};
pub use enhance::{
    ai_enhance, crop_to_element, ClipboardSink, EnhanceOutcome, EnhanceStatus, PromptBackend,
    ScreenshotSource,
};
#[cfg(feature = "clipboard")]
pub use enhance::SystemClipboard;
pub use guides::{measure, Guide, GuideAxis};
pub use serialize::{component_prompt, element_prompt, serialize_with_styles};

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// A page element, by snapshot node id
    Element(String),
    /// The inspector's own overlay, tooltip, guides or card
    InspectorUi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorEvent {
    Enable,
    Disable,
    PointerMove(PointerTarget),
    Click(PointerTarget),
    /// The card's close button; shuts the inspector down
    Close,
    /// Drops the selection but keeps inspecting
    Deselect,
    SetHoverMode(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InspectorState {
    #[default]
    Idle,
    Hovering {
        hovered: Option<String>,
    },
    Selected {
        selected: String,
        hovered: Option<String>,
    },
}

impl InspectorState {
    pub fn is_active(&self) -> bool {
        !matches!(self, InspectorState::Idle)
    }

    pub fn hovered(&self) -> Option<&str> {
        match self {
            InspectorState::Idle => None,
            InspectorState::Hovering { hovered } | InspectorState::Selected { hovered, .. } => {
                hovered.as_deref()
            }
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            InspectorState::Selected { selected, .. } => Some(selected),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Inspector {
    state: InspectorState,
    hover_mode: bool,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InspectorState {
        &self.state
    }

    pub fn hover_mode(&self) -> bool {
        self.hover_mode
    }

    /// Applies one event. Events that make no sense in the current state are ignored.
    pub fn handle(&mut self, event: InspectorEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = match (state, event) {
            (InspectorState::Idle, InspectorEvent::Enable) => {
                InspectorState::Hovering { hovered: None }
            }
            (_, InspectorEvent::Disable) | (_, InspectorEvent::Close) => InspectorState::Idle,
            (InspectorState::Idle, InspectorEvent::SetHoverMode(on)) => {
                self.hover_mode = on;
                InspectorState::Idle
            }
            (InspectorState::Idle, _) => InspectorState::Idle,

            (state, InspectorEvent::PointerMove(PointerTarget::InspectorUi))
            | (state, InspectorEvent::Click(PointerTarget::InspectorUi))
            | (state, InspectorEvent::Enable) => state,

            (state, InspectorEvent::PointerMove(PointerTarget::Element(id))) => {
                if self.hover_mode {
                    InspectorState::Selected {
                        selected: id.clone(),
                        hovered: Some(id),
                    }
                } else {
                    match state {
                        InspectorState::Selected { selected, .. } => InspectorState::Selected {
                            selected,
                            hovered: Some(id),
                        },
                        _ => InspectorState::Hovering { hovered: Some(id) },
                    }
                }
            }
            (state, InspectorEvent::Click(PointerTarget::Element(_))) => {
                match state.hovered().map(str::to_string) {
                    Some(hovered) => InspectorState::Selected {
                        selected: hovered.clone(),
                        hovered: Some(hovered),
                    },
                    None => state,
                }
            }
            (InspectorState::Selected { hovered, .. }, InspectorEvent::Deselect) => {
                InspectorState::Hovering { hovered }
            }
            (state, InspectorEvent::Deselect) => state,
            (state, InspectorEvent::SetHoverMode(on)) => {
                self.hover_mode = on;
                match state.hovered().map(str::to_string) {
                    Some(hovered) if on => InspectorState::Selected {
                        selected: hovered.clone(),
                        hovered: Some(hovered),
                    },
                    _ => state,
                }
            }
        };
    }

    /// What the inspector currently shows over `doc`.
    pub fn view(&self, doc: &Document<'_>) -> InspectorView {
        let hovered = self.state.hovered().and_then(|id| doc.node(id));
        let selected = self.state.selected().and_then(|id| doc.node(id));

        let guides = match (selected, hovered) {
            (Some(s), Some(h)) if s.id != h.id => measure(&s.bounding_box, &h.bounding_box),
            _ => Vec::new(),
        };

        InspectorView {
            tooltip: hovered.map(tooltip),
            card: selected.map(DetailCard::from_node),
            guides,
            hover_mode: self.hover_mode,
        }
    }
}

/// Rendered inspector overlay state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<DetailCard>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guides: Vec<Guide>,
    pub hover_mode: bool,
}
