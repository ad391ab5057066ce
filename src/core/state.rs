//! # Application State
//!
//! Core state for Folio. Domain data only, no TUI types. Presentation
//! state (scroll offsets, hit regions, overlays) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── book: Book                      // content as loaded
//! ├── nav: NavigationController       // current page, transition lock, progress
//! ├── stage: Stage                    // visual tags + focus read by the renderer
//! ├── scheduler: Scheduler            // pending one-shot timers
//! ├── quiz: Vec<QuizGroup>            // live quiz selections
//! ├── items / zones                   // drag-and-drop widgets
//! ├── feedback: HashMap               // quiz feedback notice per group
//! ├── check_status: CheckStatus       // label on the check control
//! ├── drag: Option<DragSession>       // item currently carried
//! └── status_message: String          // status bar text
//! ```
//!
//! State changes only happen through `update(state, action, now)` in
//! action.rs.

use std::collections::HashMap;

use crate::core::activity::drag_drop::{DragItem, DropZone};
use crate::core::activity::quiz::{QuizGroup, Verdict};
use crate::core::book::{Book, BookError, Page};
use crate::core::config::Timing;
use crate::core::navigation::NavigationController;
use crate::core::progress::ProgressStore;
use crate::core::scheduler::Scheduler;
use crate::core::surface::{Stage, Surface, WidgetId};

/// Transient feedback attached to a quiz group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackNotice {
    /// Distinguishes this notice from the ones it replaced.
    pub serial: u64,
    pub verdict: Verdict,
    pub fading: bool,
}

impl FeedbackNotice {
    pub fn text(&self) -> &'static str {
        self.verdict.message()
    }
}

/// Label state of the "check answers" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckStatus {
    #[default]
    Neutral,
    AllCorrect,
    SomeIncorrect,
}

impl CheckStatus {
    pub fn label(self) -> &'static str {
        match self {
            CheckStatus::Neutral => "Check answers",
            CheckStatus::AllCorrect => "All correct!",
            CheckStatus::SomeIncorrect => "Some answers are incorrect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Pointer,
    Keyboard,
}

/// An item in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub item: String,
    pub payload: String,
    pub source: DragSource,
    /// Zone currently hovered, if any.
    pub over: Option<String>,
}

pub struct App {
    pub book: Book,
    pub nav: NavigationController,
    pub stage: Stage,
    pub scheduler: Scheduler,
    pub quiz: Vec<QuizGroup>,
    pub items: Vec<DragItem>,
    pub zones: Vec<DropZone>,
    pub feedback: HashMap<String, FeedbackNotice>,
    pub check_status: CheckStatus,
    pub drag: Option<DragSession>,
    pub timing: Timing,
    pub status_message: String,
    feedback_serial: u64,
}

impl App {
    /// Build the app for `book`, resuming saved progress unless `restart`.
    pub fn new(
        book: Book,
        store: Box<dyn ProgressStore>,
        timing: Timing,
        restart: bool,
    ) -> Result<Self, BookError> {
        let pages = book.sequence()?;
        let key = book.progress_key();
        let nav = if restart {
            NavigationController::fresh(pages, store, key, timing.page_exit)
        } else {
            NavigationController::restore(pages, store, key, timing.page_exit)
        };

        let mut stage = Stage::with_pages(book.pages.iter().map(|p| p.id.as_str()));
        nav.mount(&mut stage);

        Ok(Self {
            quiz: book.quiz_groups(),
            items: book.drag_items(),
            zones: book.drop_zones(),
            status_message: format!("Welcome to {}", book.title),
            book,
            nav,
            stage,
            scheduler: Scheduler::new(),
            feedback: HashMap::new(),
            check_status: CheckStatus::Neutral,
            drag: None,
            timing,
            feedback_serial: 0,
        })
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.book.page(self.nav.current_page_id())
    }

    pub fn groups_on<'a>(&'a self, page_id: &'a str) -> impl Iterator<Item = &'a QuizGroup> + 'a {
        self.quiz.iter().filter(move |g| g.page == page_id)
    }

    pub fn items_on<'a>(&'a self, page_id: &'a str) -> impl Iterator<Item = &'a DragItem> + 'a {
        self.items.iter().filter(move |i| i.page == page_id)
    }

    pub fn zones_on<'a>(&'a self, page_id: &'a str) -> impl Iterator<Item = &'a DropZone> + 'a {
        self.zones.iter().filter(move |z| z.page == page_id)
    }

    pub fn item(&self, id: &str) -> Option<&DragItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn zone(&self, id: &str) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Tab order on the current page: heading, options, check control,
    /// items, zones.
    pub fn focus_order(&self) -> Vec<WidgetId> {
        let page = self.nav.current_page_id();
        let mut order = vec![WidgetId::heading(page)];

        let mut has_quiz = false;
        for group in self.groups_on(page) {
            has_quiz = true;
            order.extend(
                group
                    .options
                    .iter()
                    .map(|o| WidgetId::option(&group.id, &o.id)),
            );
        }
        if has_quiz {
            order.push(WidgetId::CheckButton);
        }
        order.extend(self.items_on(page).map(|i| WidgetId::item(&i.id)));
        order.extend(self.zones_on(page).map(|z| WidgetId::zone(&z.id)));
        order
    }

    /// True when Space/Enter would act on the focused widget.
    pub fn focus_is_interactive(&self) -> bool {
        self.stage
            .focused()
            .is_some_and(|w| w.is_interactive() && self.focus_order().contains(w))
    }

    /// Move focus one place through the focus order, wrapping.
    /// Returns the previously focused widget.
    pub fn cycle_focus(&mut self, forward: bool) -> Option<WidgetId> {
        let order = self.focus_order();
        let previous = self.stage.focused().cloned();
        let position = previous
            .as_ref()
            .and_then(|w| order.iter().position(|o| o == w));
        let next = match (position, forward) {
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
            (None, true) => 0,
            (None, false) => order.len() - 1,
        };
        self.stage.focus(order[next].clone());
        previous
    }

    pub(crate) fn next_feedback_serial(&mut self) -> u64 {
        self.feedback_serial += 1;
        self.feedback_serial
    }
}
