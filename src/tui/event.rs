use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use log::{debug, warn};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    // Page turning
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,

    // Widget interaction
    Space, // Activates the focused widget, or turns the page
    Enter,
    FocusNext,
    FocusPrevious,
    Escape,

    // Presentation
    CursorUp,
    CursorDown,
    ScrollPageUp,
    ScrollPageDown,
    WheelUp,
    WheelDown,
    ToggleContents,
    Resize,

    // Pointer (column, row)
    MouseDown(u16, u16),
    MouseDrag(u16, u16),
    MouseUp(u16, u16),

    Quit,
    ForceQuit, // Ctrl+C
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => match event::read() {
            Ok(raw) => map_event(raw),
            Err(e) => {
                warn!("Failed to read terminal event: {}", e);
                None
            }
        },
        Ok(false) => None,
        Err(e) => {
            warn!("Failed to poll terminal events: {}", e);
            None
        }
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Translate a raw crossterm event.
pub fn map_event(raw: Event) -> Option<TuiEvent> {
    match raw {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<TuiEvent> {
    // Kitty protocol reports releases too
    if key.kind == KeyEventKind::Release {
        return None;
    }
    debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
        (_, KeyCode::Right) => Some(TuiEvent::NextPage),
        (_, KeyCode::Left) => Some(TuiEvent::PreviousPage),
        (_, KeyCode::Home) => Some(TuiEvent::FirstPage),
        (_, KeyCode::End) => Some(TuiEvent::LastPage),
        (_, KeyCode::Char(' ')) => Some(TuiEvent::Space),
        (_, KeyCode::Enter) => Some(TuiEvent::Enter),
        (_, KeyCode::Tab) => Some(TuiEvent::FocusNext),
        (_, KeyCode::BackTab) => Some(TuiEvent::FocusPrevious),
        (_, KeyCode::Esc) => Some(TuiEvent::Escape),
        (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
        (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
        (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
        (_, KeyCode::PageDown) => Some(TuiEvent::ScrollPageDown),
        (_, KeyCode::Char('t')) => Some(TuiEvent::ToggleContents),
        (_, KeyCode::Char('q')) => Some(TuiEvent::Quit),
        _ => None,
    }
}

fn map_mouse(mouse: MouseEvent) -> Option<TuiEvent> {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(TuiEvent::MouseDown(col, row)),
        MouseEventKind::Drag(MouseButton::Left) => Some(TuiEvent::MouseDrag(col, row)),
        MouseEventKind::Up(MouseButton::Left) => Some(TuiEvent::MouseUp(col, row)),
        MouseEventKind::ScrollUp => Some(TuiEvent::WheelUp),
        MouseEventKind::ScrollDown => Some(TuiEvent::WheelDown),
        _ => None,
    }
}
