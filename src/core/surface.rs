//! # Rendering Surface
//!
//! The contract the core uses to drive whatever is drawing the book.
//! Core code never paints anything itself: it looks pages up, adds or
//! removes visual tags on widgets, and moves focus.
//!
//! ```text
//! NavigationController ─┐
//!                       ├──▶ dyn Surface ──▶ Stage ──▶ tui::ui (ratatui)
//! quiz / drag_drop ─────┘
//! ```
//!
//! `Stage` is the in-memory implementation. The TUI reads it every frame,
//! and tests assert against it directly.

use std::collections::{BTreeSet, HashMap, HashSet};

/// Identity of a renderable element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetId {
    /// A page container.
    Page(String),
    /// The primary heading of a page (the focus target after a transition).
    Heading(String),
    /// One quiz option, addressed by its group.
    QuizOption { group: String, option: String },
    /// The "check answers" control.
    CheckButton,
    /// A draggable item.
    DragItem(String),
    /// A drop target.
    DropZone(String),
}

impl WidgetId {
    pub fn page(id: &str) -> Self {
        WidgetId::Page(id.to_string())
    }

    pub fn heading(id: &str) -> Self {
        WidgetId::Heading(id.to_string())
    }

    pub fn option(group: &str, option: &str) -> Self {
        WidgetId::QuizOption {
            group: group.to_string(),
            option: option.to_string(),
        }
    }

    pub fn item(id: &str) -> Self {
        WidgetId::DragItem(id.to_string())
    }

    pub fn zone(id: &str) -> Self {
        WidgetId::DropZone(id.to_string())
    }

    /// Headings take focus but have nothing to activate.
    pub fn is_interactive(&self) -> bool {
        !matches!(self, WidgetId::Page(_) | WidgetId::Heading(_))
    }
}

/// Named visual states the core can toggle on a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualTag {
    /// The page currently shown.
    Active,
    /// The page playing its exit animation.
    Exiting,
    /// Quiz option selected and right.
    Correct,
    /// Quiz option selected and wrong.
    Incorrect,
    /// Item being carried by pointer or keyboard.
    Dragging,
    /// Zone with a drag hovering over it.
    Hover,
    /// Zone that just received a matching drop.
    Matched,
    /// Zone that just received a non-matching drop.
    Mismatched,
}

/// What the core needs from a renderer.
pub trait Surface {
    /// True if a renderable container exists for this page id.
    fn has_page(&self, page_id: &str) -> bool;

    fn add_tag(&mut self, widget: &WidgetId, tag: VisualTag);

    fn remove_tag(&mut self, widget: &WidgetId, tag: VisualTag);

    /// Move input focus. Never leaves focus unset.
    fn focus(&mut self, widget: WidgetId);
}

/// In-memory surface: registered pages, tag sets per widget, and focus.
#[derive(Debug, Default, Clone)]
pub struct Stage {
    pages: HashSet<String>,
    tags: HashMap<WidgetId, BTreeSet<VisualTag>>,
    focused: Option<WidgetId>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stage with a container registered for every given page.
    pub fn with_pages<'a>(pages: impl IntoIterator<Item = &'a str>) -> Self {
        let mut stage = Self::new();
        for page in pages {
            stage.register_page(page);
        }
        stage
    }

    pub fn register_page(&mut self, page_id: &str) {
        self.pages.insert(page_id.to_string());
    }

    pub fn has_tag(&self, widget: &WidgetId, tag: VisualTag) -> bool {
        self.tags.get(widget).is_some_and(|set| set.contains(&tag))
    }

    pub fn tags(&self, widget: &WidgetId) -> impl Iterator<Item = VisualTag> + '_ {
        self.tags.get(widget).into_iter().flatten().copied()
    }

    pub fn focused(&self) -> Option<&WidgetId> {
        self.focused.as_ref()
    }

    /// Every widget currently carrying `tag`, in a stable order.
    pub fn widgets_with(&self, tag: VisualTag) -> Vec<&WidgetId> {
        let mut found: Vec<&WidgetId> = self
            .tags
            .iter()
            .filter(|(_, set)| set.contains(&tag))
            .map(|(widget, _)| widget)
            .collect();
        found.sort();
        found
    }
}

impl Surface for Stage {
    fn has_page(&self, page_id: &str) -> bool {
        self.pages.contains(page_id)
    }

    fn add_tag(&mut self, widget: &WidgetId, tag: VisualTag) {
        self.tags.entry(widget.clone()).or_default().insert(tag);
    }

    fn remove_tag(&mut self, widget: &WidgetId, tag: VisualTag) {
        if let Some(set) = self.tags.get_mut(widget) {
            set.remove(&tag);
            if set.is_empty() {
                self.tags.remove(widget);
            }
        }
    }

    fn focus(&mut self, widget: WidgetId) {
        self.focused = Some(widget);
    }
}
