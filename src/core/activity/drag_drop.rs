//! Drag-and-drop matching.
//!
//! An item carries a type tag; a zone accepts one tag. A drop matches when
//! the two are equal. Nothing is remembered beyond the zone's short-lived
//! match indicator.

use log::debug;

use crate::core::surface::{Surface, VisualTag, WidgetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragItem {
    pub id: String,
    pub page: String,
    pub label: String,
    pub type_tag: String,
}

impl DragItem {
    pub fn new(id: &str, page: &str, label: &str, type_tag: &str) -> Self {
        Self {
            id: id.to_string(),
            page: page.to_string(),
            label: label.to_string(),
            type_tag: type_tag.to_string(),
        }
    }

    fn widget(&self) -> WidgetId {
        WidgetId::item(&self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchState {
    #[default]
    Neutral,
    Matched,
    Mismatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropZone {
    pub id: String,
    pub page: String,
    pub label: String,
    pub accept_tag: String,
    pub match_state: MatchState,
}

impl DropZone {
    pub fn new(id: &str, page: &str, label: &str, accept_tag: &str) -> Self {
        Self {
            id: id.to_string(),
            page: page.to_string(),
            label: label.to_string(),
            accept_tag: accept_tag.to_string(),
            match_state: MatchState::Neutral,
        }
    }

    fn widget(&self) -> WidgetId {
        WidgetId::zone(&self.id)
    }
}

/// Pick up `item`. Returns the payload carried by the drag.
pub fn drag_start(item: &DragItem, surface: &mut dyn Surface) -> String {
    surface.add_tag(&item.widget(), VisualTag::Dragging);
    debug!("Drag start: '{}' carrying '{}'", item.id, item.type_tag);
    item.type_tag.clone()
}

/// Put `item` down, whatever happened to the drag.
pub fn drag_end(item: &DragItem, surface: &mut dyn Surface) {
    surface.remove_tag(&item.widget(), VisualTag::Dragging);
}

pub fn drag_over(zone: &DropZone, surface: &mut dyn Surface) {
    surface.add_tag(&zone.widget(), VisualTag::Hover);
}

pub fn drag_leave(zone: &DropZone, surface: &mut dyn Surface) {
    surface.remove_tag(&zone.widget(), VisualTag::Hover);
}

/// Drop `payload` on `zone` and record whether it matched.
pub fn drop(zone: &mut DropZone, payload: &str, surface: &mut dyn Surface) -> MatchState {
    let widget = zone.widget();
    surface.remove_tag(&widget, VisualTag::Hover);

    let (state, tag) = if payload == zone.accept_tag {
        (MatchState::Matched, VisualTag::Matched)
    } else {
        (MatchState::Mismatched, VisualTag::Mismatched)
    };
    zone.match_state = state;
    surface.add_tag(&widget, tag);

    debug!(
        "Drop '{}' on '{}' (accepts '{}'): {:?}",
        payload, zone.id, zone.accept_tag, state
    );
    state
}

/// Remove a previous drop's indicator from `zone`.
///
/// The match state only resets if it still holds the outcome being
/// cleared; a later drop's indicator stays until its own timer.
pub fn clear_indicator(zone: &mut DropZone, matched: bool, surface: &mut dyn Surface) {
    let (state, tag) = if matched {
        (MatchState::Matched, VisualTag::Matched)
    } else {
        (MatchState::Mismatched, VisualTag::Mismatched)
    };
    surface.remove_tag(&zone.widget(), tag);
    if zone.match_state == state {
        zone.match_state = MatchState::Neutral;
    }
}
