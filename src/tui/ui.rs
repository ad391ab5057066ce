use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;

use crate::core::state::App;
use crate::core::surface::WidgetId;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{Contents, NavBar, NavButton, PageView, TitleBar};

const HELP_TEXT: &str = "←/→ turn  Tab focus  Enter select  t contents  q quit";
const DRAG_HELP_TEXT: &str = "Tab to a zone  Enter drop  Esc put down";

/// Screen regions, shared by drawing and hit testing.
pub struct UiAreas {
    pub title: Rect,
    pub page: Rect,
    pub nav: Rect,
    pub help: Rect,
}

pub fn layout(area: Rect) -> UiAreas {
    use Constraint::{Length, Min};
    let [title, page, nav, help] =
        Layout::vertical([Length(1), Min(0), Length(1), Length(1)]).areas(area);
    UiAreas {
        title,
        page,
        nav,
        help,
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Widget(WidgetId),
    Nav(NavButton),
}

/// Hit test a screen position against the last rendered frame.
pub fn hit_test(tui: &TuiState, frame_area: Rect, col: u16, row: u16) -> Option<Hit> {
    let areas = layout(frame_area);
    if let Some(button) = NavBar::hit_test(areas.nav, col, row) {
        return Some(Hit::Nav(button));
    }
    tui.page_view
        .hit_test(col, row)
        .cloned()
        .map(Hit::Widget)
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let areas = layout(frame.area());

    TitleBar::new(
        app.book.title.clone(),
        app.nav.current_index(),
        app.nav.pages().len(),
        app.status_message.clone(),
    )
    .render(frame, areas.title);

    PageView::new(&mut tui.page_view, app).render(frame, areas.page);

    NavBar::new(
        app.nav.is_previous_enabled(),
        app.nav.is_next_enabled(),
        app.nav.progress_ratio(),
    )
    .render(frame, areas.nav);

    let help = if app.drag.is_some() {
        DRAG_HELP_TEXT
    } else {
        HELP_TEXT
    };
    frame.render_widget(
        Line::from(help).style(Style::default().fg(Color::DarkGray)),
        areas.help,
    );

    // Overlay last so it covers everything
    if let Some(contents) = tui.contents.as_mut() {
        Contents::new(contents).render(frame, frame.area());
    }
}
