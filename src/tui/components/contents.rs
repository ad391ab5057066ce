//! # Contents Overlay
//!
//! Centered table of contents for jumping straight to a page.
//! Opened with `t`, dismissed with Esc or `t` again.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ContentsState` lives in `TuiState` while the overlay is open
//! - `Contents` is created each frame with borrowed state

use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding};
use unicode_width::UnicodeWidthStr;

use crate::core::book::Book;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub struct ContentsEntry {
    pub page_id: String,
    pub heading: String,
}

/// Persistent state for the contents overlay.
pub struct ContentsState {
    pub entries: Vec<ContentsEntry>,
    /// Page the reader is on; marked in the list.
    pub current: usize,
    pub selected: usize,
    /// When progress was last written, epoch millis.
    pub saved_at: Option<i64>,
    pub list_state: ListState,
}

impl ContentsState {
    pub fn new(book: &Book, current: usize, saved_at: Option<i64>) -> Self {
        let entries: Vec<ContentsEntry> = book
            .pages
            .iter()
            .map(|p| ContentsEntry {
                page_id: p.id.clone(),
                heading: p.heading.clone(),
            })
            .collect();
        let selected = current.min(entries.len().saturating_sub(1));
        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(selected));
        }
        Self {
            entries,
            current,
            selected,
            saved_at,
            list_state,
        }
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.list_state.select(Some(index));
    }
}

/// Events emitted by the contents overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentsEvent {
    Jump(String),
    Dismiss,
}

impl EventHandler for ContentsState {
    type Event = ContentsEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ContentsEvent> {
        if self.entries.is_empty() {
            return matches!(event, TuiEvent::Escape | TuiEvent::ToggleContents)
                .then_some(ContentsEvent::Dismiss);
        }
        let last = self.entries.len() - 1;
        match event {
            TuiEvent::Escape | TuiEvent::ToggleContents => Some(ContentsEvent::Dismiss),
            TuiEvent::CursorUp | TuiEvent::WheelUp => {
                self.select(self.selected.saturating_sub(1));
                None
            }
            TuiEvent::CursorDown | TuiEvent::WheelDown => {
                self.select((self.selected + 1).min(last));
                None
            }
            TuiEvent::FirstPage => {
                self.select(0);
                None
            }
            TuiEvent::LastPage => {
                self.select(last);
                None
            }
            TuiEvent::Enter | TuiEvent::Space => self
                .entries
                .get(self.selected)
                .map(|entry| ContentsEvent::Jump(entry.page_id.clone())),
            _ => None,
        }
    }
}

/// Transient render wrapper for the contents overlay.
pub struct Contents<'a> {
    state: &'a mut ContentsState,
}

impl<'a> Contents<'a> {
    pub fn new(state: &'a mut ContentsState) -> Self {
        Self { state }
    }
}

impl Component for Contents<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 80, area);
        frame.render_widget(Clear, overlay);

        let saved = match self.state.saved_at {
            Some(ms) => format!(" Saved {} ", format_timestamp(ms)),
            None => " Not saved yet ".to_string(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Contents ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Enter Go  Esc Back ").centered())
            .title_bottom(Line::from(saved).right_aligned())
            .padding(Padding::horizontal(1));

        // borders + padding
        let inner_width = overlay.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .state
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let number = format!("{:>2}. ", i + 1);
                let marker = if i == self.state.current { " ●" } else { "" };
                let heading_width = inner_width.saturating_sub(number.width() + marker.width());
                let heading = truncate_str(&entry.heading, heading_width);

                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(number, style),
                    Span::styled(heading, style),
                    Span::styled(marker, style.fg(Color::Cyan)),
                ]))
            })
            .collect();

        frame.render_stateful_widget(
            List::new(items).block(block),
            overlay,
            &mut self.state.list_state,
        );
    }
}

/// Format epoch millis as "Jan 15 14:02" local time.
fn format_timestamp(epoch_millis: i64) -> String {
    let dt: DateTime<Local> = DateTime::<Utc>::from_timestamp_millis(epoch_millis)
        .unwrap_or_default()
        .with_timezone(&Local);
    dt.format("%b %d %H:%M").to_string()
}

/// Truncate to `max_width` display columns, ending in "..." when cut.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
