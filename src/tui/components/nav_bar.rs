//! # NavBar Component
//!
//! Bottom navigation line: previous button, reading progress, next button.
//!
//! ```text
//!  [◀ Prev]  38% ────────────────────────────  [Next ▶]
//! ```
//!
//! Buttons at either end of the book are drawn disabled. Clicks are mapped
//! back to buttons with [`NavBar::hit_test`], which uses the same layout as
//! rendering.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{LineGauge, Paragraph};

use crate::tui::component::Component;

const BUTTON_WIDTH: u16 = 10;
const PREVIOUS_LABEL: &str = "[◀ Prev]";
const NEXT_LABEL: &str = "[Next ▶]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    Previous,
    Next,
}

pub struct NavBar {
    pub previous_enabled: bool,
    pub next_enabled: bool,
    /// 0.0 on the first page, 1.0 on the last.
    pub progress: f64,
}

impl NavBar {
    pub fn new(previous_enabled: bool, next_enabled: bool, progress: f64) -> Self {
        Self {
            previous_enabled,
            next_enabled,
            progress,
        }
    }

    fn areas(area: Rect) -> [Rect; 3] {
        Layout::horizontal([
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Min(0),
            Constraint::Length(BUTTON_WIDTH),
        ])
        .areas(area)
    }

    /// Which button, if any, sits at (`col`, `row`) when the bar is drawn in `area`.
    pub fn hit_test(area: Rect, col: u16, row: u16) -> Option<NavButton> {
        let [previous, _, next] = Self::areas(area);
        let position = Position::new(col, row);
        if previous.contains(position) {
            Some(NavButton::Previous)
        } else if next.contains(position) {
            Some(NavButton::Next)
        } else {
            None
        }
    }
}

fn button_style(enabled: bool) -> Style {
    if enabled {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    }
}

impl Component for NavBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [previous, gauge_area, next] = Self::areas(area);
        let ratio = self.progress.clamp(0.0, 1.0);

        frame.render_widget(
            Paragraph::new(PREVIOUS_LABEL).style(button_style(self.previous_enabled)),
            previous,
        );
        frame.render_widget(
            LineGauge::default()
                .filled_style(Style::default().fg(Color::Cyan))
                .unfilled_style(Style::default().fg(Color::DarkGray))
                .label(format!("{:>3}%", (ratio * 100.0).round() as u16))
                .ratio(ratio),
            gauge_area,
        );
        frame.render_widget(
            Paragraph::new(NEXT_LABEL)
                .style(button_style(self.next_enabled))
                .alignment(Alignment::Right),
            next,
        );
    }
}
