use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::TuiEvent;

/// Something drawn into a region of the frame.
///
/// Components are built per frame from props (struct fields) plus, for the
/// stateful ones, a `&mut` borrow of state kept in `TuiState`. `render`
/// takes `&mut self` so a component can record what it measured (hit
/// regions, content height) back into that state.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events.
pub trait EventHandler {
    /// What the component asks its parent to do.
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
