//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Pending timers** (page exit, feedback fade, indicators): the poll
//!   timeout is cut to the next deadline, so deferred actions run on time
//!   and the frame that shows them is drawn right away.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! ## Pointer Drags
//!
//! Mouse down on an item starts a drag, motion over drop zones sends
//! over/leave, and release drops on the zone under the pointer (if any)
//! before ending the drag.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use log::{debug, info};
use ratatui::layout::Rect;

use crate::core::action::{Action, Effect, update};
use crate::core::state::{App, DragSource};
use crate::core::surface::WidgetId;
use crate::tui::component::EventHandler;
use crate::tui::components::{ContentsEvent, ContentsState, NavButton, PageViewState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::Hit;

const IDLE_POLL: Duration = Duration::from_millis(500);
/// Upper bound while timers are pending, keeps fades visibly moving.
const BUSY_POLL: Duration = Duration::from_millis(80);

/// TUI-specific presentation state (not part of core logic)
pub struct TuiState {
    pub page_view: PageViewState,
    /// Contents overlay (None = hidden)
    pub contents: Option<ContentsState>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            page_view: PageViewState::new(),
            contents: None,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse capture)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

pub fn run(mut app: App) -> std::io::Result<()> {
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = poll_timeout(&app, Instant::now());
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let frame_area = terminal.get_frame().area();
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, frame_area, event, Instant::now()) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        // Deferred actions that came due while waiting
        if !app.scheduler.is_idle() {
            let effect = dispatch(&mut app, &mut tui, Action::Tick, Instant::now());
            needs_redraw = true;
            if effect == Effect::Quit {
                break;
            }
        }
    }

    info!("Closing on page {}", app.nav.current_page_id());
    ratatui::restore();
    Ok(())
}

/// How long to wait for input before timers need attention.
fn poll_timeout(app: &App, now: Instant) -> Duration {
    match app.scheduler.next_deadline() {
        Some(deadline) => deadline.saturating_duration_since(now).min(BUSY_POLL),
        None => IDLE_POLL,
    }
}

/// Run an action through the reducer and apply its effect to TUI state.
fn dispatch(app: &mut App, tui: &mut TuiState, action: Action, now: Instant) -> Effect {
    debug!("Dispatching {:?}", action);
    let effect = update(app, action, now);
    if effect == Effect::PageChanged {
        tui.page_view.reset();
    }
    effect
}

/// Handle one terminal event. Returns true when the app should quit.
fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    frame_area: Rect,
    event: TuiEvent,
    now: Instant,
) -> bool {
    if matches!(event, TuiEvent::Resize) {
        return false;
    }
    if matches!(event, TuiEvent::ForceQuit) {
        return dispatch(app, tui, Action::Quit, now) == Effect::Quit;
    }

    // Contents overlay takes every event while open
    if let Some(contents) = tui.contents.as_mut() {
        match contents.handle_event(&event) {
            Some(ContentsEvent::Jump(page_id)) => {
                tui.contents = None;
                dispatch(app, tui, Action::GoTo(page_id), now);
            }
            Some(ContentsEvent::Dismiss) => tui.contents = None,
            None => {}
        }
        return false;
    }

    if tui.page_view.scroll(&event) {
        return false;
    }

    let action = match event {
        TuiEvent::Quit => Action::Quit,
        TuiEvent::NextPage => Action::Next,
        TuiEvent::PreviousPage => Action::Previous,
        TuiEvent::FirstPage => Action::First,
        TuiEvent::LastPage => Action::Last,
        TuiEvent::Space if app.focus_is_interactive() => Action::Activate,
        TuiEvent::Space => Action::Next,
        TuiEvent::Enter => Action::Activate,
        TuiEvent::FocusNext => Action::FocusNext,
        TuiEvent::FocusPrevious => Action::FocusPrevious,
        TuiEvent::Escape => Action::CancelDrag,
        TuiEvent::ToggleContents => {
            tui.contents = Some(ContentsState::new(
                &app.book,
                app.nav.current_index(),
                app.nav.last_saved_at(),
            ));
            return false;
        }
        TuiEvent::MouseDown(col, row) => {
            return handle_pointer_down(app, tui, frame_area, col, row, now);
        }
        TuiEvent::MouseDrag(col, row) => {
            handle_pointer_move(app, tui, frame_area, col, row, now);
            return false;
        }
        TuiEvent::MouseUp(col, row) => {
            handle_pointer_up(app, tui, frame_area, col, row, now);
            return false;
        }
        _ => return false,
    };

    let effect = dispatch(app, tui, action, now);
    if effect == Effect::Quit {
        return true;
    }
    // Keep keyboard focus on screen
    if let Some(focused) = app.stage.focused().cloned() {
        tui.page_view.scroll_to(&focused);
    }
    false
}

fn zone_at(tui: &TuiState, frame_area: Rect, col: u16, row: u16) -> Option<String> {
    match ui::hit_test(tui, frame_area, col, row) {
        Some(Hit::Widget(WidgetId::DropZone(zone))) => Some(zone),
        _ => None,
    }
}

fn pointer_session(app: &App) -> Option<(String, String, Option<String>)> {
    app.drag
        .as_ref()
        .filter(|s| s.source == DragSource::Pointer)
        .map(|s| (s.item.clone(), s.payload.clone(), s.over.clone()))
}

fn handle_pointer_down(
    app: &mut App,
    tui: &mut TuiState,
    frame_area: Rect,
    col: u16,
    row: u16,
    now: Instant,
) -> bool {
    let action = match ui::hit_test(tui, frame_area, col, row) {
        Some(Hit::Nav(NavButton::Previous)) => Action::Previous,
        Some(Hit::Nav(NavButton::Next)) => Action::Next,
        Some(Hit::Widget(WidgetId::QuizOption { group, option })) => {
            Action::SelectOption { group, option }
        }
        Some(Hit::Widget(WidgetId::CheckButton)) => Action::CheckAnswers,
        Some(Hit::Widget(WidgetId::DragItem(item))) => Action::DragStart(item),
        _ => return false,
    };
    dispatch(app, tui, action, now) == Effect::Quit
}

fn handle_pointer_move(
    app: &mut App,
    tui: &mut TuiState,
    frame_area: Rect,
    col: u16,
    row: u16,
    now: Instant,
) {
    let Some((_, _, over)) = pointer_session(app) else {
        return;
    };
    let target = zone_at(tui, frame_area, col, row);
    if target == over {
        return;
    }
    if let Some(previous) = over {
        dispatch(app, tui, Action::DragLeave(previous), now);
    }
    if let Some(zone) = target {
        dispatch(app, tui, Action::DragOver(zone), now);
    }
}

fn handle_pointer_up(
    app: &mut App,
    tui: &mut TuiState,
    frame_area: Rect,
    col: u16,
    row: u16,
    now: Instant,
) {
    let Some((item, payload, over)) = pointer_session(app) else {
        return;
    };
    let target = zone_at(tui, frame_area, col, row);
    if let Some(previous) = over
        && target.as_ref() != Some(&previous)
    {
        dispatch(app, tui, Action::DragLeave(previous), now);
    }
    if let Some(zone) = target {
        dispatch(app, tui, Action::Drop { zone, payload }, now);
    }
    dispatch(app, tui, Action::DragEnd(item), now);
}
