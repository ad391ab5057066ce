//! # Page Navigation
//!
//! `NavigationController` owns the page order, the current page, the
//! transition lock, and reading progress.
//!
//! ```text
//!            go_to(valid)                  FinishTransition fires
//!   Idle ─────────────────▶ Transitioning ─────────────────────────▶ Idle
//!    ▲                          │
//!    └── go_to while busy ──────┘  (rejected, never queued)
//! ```
//!
//! A transition tags the old page `Exiting`, then after the exit delay
//! swaps `Active` to the new page, saves progress, and focuses the new
//! heading. At most one transition is ever in flight.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::core::book::PageSequence;
use crate::core::progress::{self, ProgressStore};
use crate::core::scheduler::{Deferred, Scheduler};
use crate::core::surface::{Surface, VisualTag, WidgetId};

/// Default length of the page exit animation.
pub const DEFAULT_EXIT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// Id absent from the sequence, or no renderable page for it.
    PageNotFound(String),
    /// Another transition is still running.
    TransitionBusy,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::PageNotFound(id) => write!(f, "page '{id}' not found"),
            NavError::TransitionBusy => write!(f, "a page transition is already running"),
        }
    }
}

impl std::error::Error for NavError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Transitioning { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    from: usize,
    to: usize,
}

pub struct NavigationController {
    pages: PageSequence,
    current_index: usize,
    pending: Option<PendingTransition>,
    exit_delay: Duration,
    store: Box<dyn ProgressStore>,
    store_key: String,
    last_saved_at: Option<i64>,
}

impl NavigationController {
    /// Create a controller, resuming from saved progress when it is valid.
    pub fn restore(
        pages: PageSequence,
        store: Box<dyn ProgressStore>,
        store_key: impl Into<String>,
        exit_delay: Duration,
    ) -> Self {
        let store_key = store_key.into();
        let saved = progress::load_progress(store.as_ref(), &store_key, pages.len());
        info!(
            "Navigation starts at page {} of {}",
            saved.page_index + 1,
            pages.len()
        );
        Self {
            pages,
            current_index: saved.page_index,
            pending: None,
            exit_delay,
            store,
            store_key,
            last_saved_at: Some(saved.saved_at_epoch_millis),
        }
    }

    /// Create a controller that starts at the first page, ignoring saved
    /// progress (the store is still written on every transition).
    pub fn fresh(
        pages: PageSequence,
        store: Box<dyn ProgressStore>,
        store_key: impl Into<String>,
        exit_delay: Duration,
    ) -> Self {
        Self {
            pages,
            current_index: 0,
            pending: None,
            exit_delay,
            store,
            store_key: store_key.into(),
            last_saved_at: None,
        }
    }

    /// Show the current page on a freshly built surface.
    pub fn mount(&self, surface: &mut dyn Surface) {
        let id = self.current_page_id();
        surface.add_tag(&WidgetId::page(id), VisualTag::Active);
        surface.focus(WidgetId::heading(id));
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Start a transition to `page_id`.
    ///
    /// Fails without side effects if the page is unknown (to the sequence
    /// or the surface) or a transition is already running.
    pub fn go_to(
        &mut self,
        page_id: &str,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> Result<(), NavError> {
        if self.pending.is_some() {
            return Err(NavError::TransitionBusy);
        }
        let target = self
            .pages
            .position(page_id)
            .filter(|_| surface.has_page(page_id))
            .ok_or_else(|| NavError::PageNotFound(page_id.to_string()))?;

        let from = self.current_index;
        self.pending = Some(PendingTransition { from, to: target });
        surface.add_tag(&WidgetId::page(self.current_page_id()), VisualTag::Exiting);
        scheduler.schedule(now, self.exit_delay, Deferred::FinishTransition);
        debug!("Transition {} -> {} started", from, target);
        Ok(())
    }

    /// Adjacent page forward. Silent no-op at the end or while busy.
    pub fn next(
        &mut self,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> Result<(), NavError> {
        if self.pending.is_some() || !self.is_next_enabled() {
            return Ok(());
        }
        let target = self.pages[self.current_index + 1].to_string();
        self.go_to(&target, surface, scheduler, now)
    }

    /// Adjacent page backward. Silent no-op at the start or while busy.
    pub fn previous(
        &mut self,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> Result<(), NavError> {
        if self.pending.is_some() || !self.is_previous_enabled() {
            return Ok(());
        }
        let target = self.pages[self.current_index - 1].to_string();
        self.go_to(&target, surface, scheduler, now)
    }

    pub fn jump_to_first(
        &mut self,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> Result<(), NavError> {
        let target = self.pages.first().to_string();
        self.go_to(&target, surface, scheduler, now)
    }

    pub fn jump_to_last(
        &mut self,
        surface: &mut dyn Surface,
        scheduler: &mut Scheduler,
        now: Instant,
    ) -> Result<(), NavError> {
        let target = self.pages.last().to_string();
        self.go_to(&target, surface, scheduler, now)
    }

    /// Complete the running transition. Returns false if none was running.
    pub fn finish_transition(&mut self, surface: &mut dyn Surface) -> bool {
        let Some(PendingTransition { from, to }) = self.pending else {
            debug!("FinishTransition fired with no transition in flight");
            return false;
        };

        let old = WidgetId::page(&self.pages[from]);
        surface.remove_tag(&old, VisualTag::Active);
        surface.remove_tag(&old, VisualTag::Exiting);
        surface.add_tag(&WidgetId::page(&self.pages[to]), VisualTag::Active);

        self.current_index = to;
        if let Some(saved) =
            progress::save_progress(self.store.as_mut(), &self.store_key, self.current_index)
        {
            self.last_saved_at = Some(saved.saved_at_epoch_millis);
        }
        self.pending = None;

        surface.focus(WidgetId::heading(&self.pages[to]));
        debug!("Transition {} -> {} committed", from, to);
        true
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    pub fn pages(&self) -> &PageSequence {
        &self.pages
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_page_id(&self) -> &str {
        &self.pages[self.current_index]
    }

    pub fn phase(&self) -> NavPhase {
        match self.pending {
            Some(PendingTransition { from, to }) => NavPhase::Transitioning { from, to },
            None => NavPhase::Idle,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_previous_enabled(&self) -> bool {
        self.current_index > 0
    }

    pub fn is_next_enabled(&self) -> bool {
        self.current_index < self.pages.last_index()
    }

    /// Position in the book from 0.0 (first page) to 1.0 (last page).
    /// A single-page book reports 0.0.
    pub fn progress_ratio(&self) -> f64 {
        let last = self.pages.last_index();
        if last == 0 {
            0.0
        } else {
            self.current_index as f64 / last as f64
        }
    }

    /// Epoch millis of the most recent save (or of the restored record).
    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }
}
