//! # TitleBar Component
//!
//! Top line: book title, page position, and the status message.
//!
//! Stateless. All three props come from core state:
//! - `book_title`: from the loaded `Book`
//! - `position`: current page index and page count
//! - `status_message`: last announcement (quiz verdicts, drop results,
//!   page changes)
//!
//! ```text
//! Voices of the Land | 3/17 | Correct!
//! ```
//!
//! The status message is dropped when empty so no trailing separator shows.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    pub book_title: String,
    /// Zero-based index of the current page.
    pub page_index: usize,
    pub page_count: usize,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(
        book_title: String,
        page_index: usize,
        page_count: usize,
        status_message: String,
    ) -> Self {
        Self {
            book_title,
            page_index,
            page_count,
            status_message,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                self.book_title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" | {}/{}", self.page_index + 1, self.page_count)),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }
        frame.render_widget(Line::from(spans), area);
    }
}
