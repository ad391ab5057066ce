//! # PageView Component
//!
//! Scrollable view of the current page: heading, markdown body, quiz groups
//! with their check control, and the drag-and-drop exercise.
//!
//! ## Architecture
//!
//! `PageView` is a transient component (created each frame) wrapping
//! `&'a mut PageViewState` (persistent) and `&'a App` (props).
//!
//! Rendering lays the page out as a column of pieces. Every interactive
//! piece records a `HitRegion` in content coordinates, so mouse input can
//! be mapped back to a `WidgetId` and keyboard focus can be scrolled into
//! view. Visual state comes from the `Stage` tags, not from the activity
//! models, so what is drawn is exactly what the core announced.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::{App, CheckStatus};
use crate::core::surface::{VisualTag, WidgetId};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

const FOCUS_MARK: &str = "▸ ";
const NO_MARK: &str = "  ";
/// Bordered drop zones: label row plus two borders.
const ZONE_HEIGHT: u16 = 3;

/// Where an interactive widget was drawn, in content rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRegion {
    pub widget: WidgetId,
    pub top: u16,
    pub height: u16,
}

/// Scroll position and last layout of the page view.
/// Persisted in `TuiState`, reset when the page changes.
#[derive(Default)]
pub struct PageViewState {
    pub scroll_state: ScrollViewState,
    pub regions: Vec<HitRegion>,
    pub content_height: u16,
    /// Screen area used by the last render.
    pub area: Rect,
}

impl PageViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous page's layout and scroll back to the top.
    pub fn reset(&mut self) {
        self.scroll_state.scroll_to_top();
        self.regions.clear();
        self.content_height = 0;
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.area.height)
    }

    /// Keep the offset inside the content.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Handle a scroll event. Returns false for anything else.
    pub fn scroll(&mut self, event: &TuiEvent) -> bool {
        match event {
            TuiEvent::CursorUp | TuiEvent::WheelUp => self.scroll_state.scroll_up(),
            TuiEvent::CursorDown | TuiEvent::WheelDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            _ => return false,
        }
        self.clamp_scroll();
        true
    }

    /// Scroll so `widget` is fully visible, if it was drawn.
    pub fn scroll_to(&mut self, widget: &WidgetId) {
        let Some(region) = self.regions.iter().find(|r| &r.widget == widget) else {
            return;
        };
        let top = region.top;
        let bottom = region.top.saturating_add(region.height);
        let offset_y = self.scroll_state.offset().y;
        let viewport = self.area.height;

        if top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: top });
        } else if bottom > offset_y.saturating_add(viewport) {
            let y = bottom.saturating_sub(viewport).min(self.max_offset());
            self.scroll_state.set_offset(Position { x: 0, y });
        }
    }

    /// The widget drawn at screen position (`col`, `row`), if any.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<&WidgetId> {
        if !self.area.contains(Position::new(col, row)) {
            return None;
        }
        let content_y = row - self.area.y + self.scroll_state.offset().y;
        self.regions
            .iter()
            .find(|r| content_y >= r.top && content_y < r.top.saturating_add(r.height))
            .map(|r| &r.widget)
    }
}

/// One row-aligned block of the page.
struct Piece {
    paragraph: Paragraph<'static>,
    height: u16,
    widget: Option<WidgetId>,
    /// Blank rows after this piece.
    gap: u16,
}

impl Piece {
    fn lines(lines: Vec<Line<'static>>, widget: Option<WidgetId>, gap: u16) -> Self {
        let height = lines.len().max(1) as u16;
        Self {
            paragraph: Paragraph::new(Text::from(lines)),
            height,
            widget,
            gap,
        }
    }
}

pub struct PageView<'a> {
    pub state: &'a mut PageViewState,
    pub app: &'a App,
}

impl<'a> PageView<'a> {
    pub fn new(state: &'a mut PageViewState, app: &'a App) -> Self {
        Self { state, app }
    }
}

impl Component for PageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // -1 for the scrollbar column
        let content_width = area.width.saturating_sub(1);
        let page_id = self.app.nav.current_page_id();
        let exiting = self
            .app
            .stage
            .has_tag(&WidgetId::page(page_id), VisualTag::Exiting);

        let pieces = build_pieces(self.app, content_width);

        self.state.regions.clear();
        let mut placed = Vec::with_capacity(pieces.len());
        let mut y: u16 = 0;
        for piece in pieces {
            if let Some(widget) = &piece.widget {
                self.state.regions.push(HitRegion {
                    widget: widget.clone(),
                    top: y,
                    height: piece.height,
                });
            }
            let top = y;
            y = y.saturating_add(piece.height).saturating_add(piece.gap);
            placed.push((top, piece));
        }
        self.state.content_height = y;
        self.state.area = area;
        self.state.clamp_scroll();

        let mut scroll_view = ScrollView::new(Size::new(content_width, y.max(1)))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for (top, piece) in placed {
            let rect = Rect::new(0, top, content_width, piece.height);
            let paragraph = if exiting {
                piece
                    .paragraph
                    .style(Style::default().add_modifier(Modifier::DIM))
            } else {
                piece.paragraph
            };
            scroll_view.render_widget(paragraph, rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

fn build_pieces(app: &App, width: u16) -> Vec<Piece> {
    let Some(page) = app.current_page() else {
        return Vec::new();
    };
    let stage = &app.stage;
    let focused = |w: &WidgetId| stage.focused() == Some(w);
    let mark = |w: &WidgetId| if focused(w) { FOCUS_MARK } else { NO_MARK };
    let mut pieces = Vec::new();

    // Heading
    let heading_id = WidgetId::heading(&page.id);
    let heading_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    pieces.push(Piece::lines(
        vec![Line::from(vec![
            Span::styled(mark(&heading_id), heading_style),
            Span::styled(page.heading.clone(), heading_style),
        ])],
        None,
        1,
    ));

    // Body
    if !page.body.trim().is_empty() {
        let paragraph = Paragraph::new(markdown::render(&page.body, Style::default()))
            .wrap(Wrap { trim: false });
        let height = paragraph.line_count(width) as u16;
        pieces.push(Piece {
            paragraph,
            height,
            widget: None,
            gap: 1,
        });
    }

    // Quiz
    let mut has_quiz = false;
    for group in app.groups_on(&page.id) {
        has_quiz = true;
        pieces.push(Piece::lines(
            styled_wrap(
                &group.prompt,
                width,
                NO_MARK,
                NO_MARK,
                Style::default().add_modifier(Modifier::BOLD),
            ),
            None,
            0,
        ));

        for option in &group.options {
            let id = WidgetId::option(&group.id, &option.id);
            let (check, mut style) = if stage.has_tag(&id, VisualTag::Correct) {
                ("(✓) ", Style::default().fg(Color::Green))
            } else if stage.has_tag(&id, VisualTag::Incorrect) {
                ("(✗) ", Style::default().fg(Color::Red))
            } else {
                ("( ) ", Style::default())
            };
            if focused(&id) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let first = format!("{}{}", mark(&id), check);
            let lines = styled_wrap(&option.label, width, &first, "      ", style);
            pieces.push(Piece::lines(lines, Some(id), 0));
        }

        // Reserved so notices don't shift the layout
        let feedback = match app.feedback.get(&group.id) {
            Some(notice) => {
                let color = if notice.verdict.correct {
                    Color::Green
                } else {
                    Color::Red
                };
                let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
                if notice.fading {
                    style = style.add_modifier(Modifier::DIM);
                }
                Line::from(Span::styled(format!("    {}", notice.text()), style))
            }
            None => Line::default(),
        };
        pieces.push(Piece::lines(vec![feedback], None, 1));
    }

    if has_quiz {
        let id = WidgetId::CheckButton;
        let color = match app.check_status {
            CheckStatus::Neutral => Color::Cyan,
            CheckStatus::AllCorrect => Color::Green,
            CheckStatus::SomeIncorrect => Color::Red,
        };
        let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        if focused(&id) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        pieces.push(Piece::lines(
            vec![Line::from(vec![
                Span::raw(mark(&id)),
                Span::styled(format!("[ {} ]", app.check_status.label()), style),
            ])],
            Some(id),
            1,
        ));
    }

    // Drag and drop
    if let Some(exercise) = &page.drag_drop {
        if !exercise.prompt.is_empty() {
            pieces.push(Piece::lines(
                styled_wrap(
                    &exercise.prompt,
                    width,
                    NO_MARK,
                    NO_MARK,
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
                None,
                1,
            ));
        }

        for item in app.items_on(&page.id) {
            let id = WidgetId::item(&item.id);
            let carried = stage.has_tag(&id, VisualTag::Dragging);
            let mut style = if carried {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if focused(&id) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let label = if carried {
                format!("{} (carrying)", item.label)
            } else {
                item.label.clone()
            };
            let first = format!("{}≡ ", mark(&id));
            pieces.push(Piece::lines(
                styled_wrap(&label, width, &first, "    ", style),
                Some(id),
                0,
            ));
        }
        if let Some(last) = pieces.last_mut() {
            last.gap = 1;
        }

        for zone in app.zones_on(&page.id) {
            let id = WidgetId::zone(&zone.id);
            let (hint, color) = if stage.has_tag(&id, VisualTag::Matched) {
                ("✓ Correct match", Color::Green)
            } else if stage.has_tag(&id, VisualTag::Mismatched) {
                ("✗ Not a match", Color::Red)
            } else if stage.has_tag(&id, VisualTag::Hover) {
                ("Release to drop", Color::Yellow)
            } else {
                ("Drop here", Color::DarkGray)
            };
            let mut border = Style::default().fg(color);
            if focused(&id) {
                border = border.add_modifier(Modifier::BOLD);
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {}{} ", mark(&id), zone.label));
            pieces.push(Piece {
                paragraph: Paragraph::new(Line::from(Span::styled(
                    hint,
                    Style::default().fg(color),
                )))
                .block(block),
                height: ZONE_HEIGHT,
                widget: Some(id),
                gap: 0,
            });
        }
    }

    pieces
}

/// Wrap `text` to `width` with separate first/continuation prefixes.
fn styled_wrap(
    text: &str,
    width: u16,
    first: &str,
    rest: &str,
    style: Style,
) -> Vec<Line<'static>> {
    let options = textwrap::Options::new(width.max(1) as usize)
        .initial_indent(first)
        .subsequent_indent(rest)
        .break_words(true);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| Line::from(Span::styled(line.into_owned(), style)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::{test_app, test_app_at};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn draw(app: &App, state: &mut PageViewState) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal
            .draw(|f| PageView::new(state, app).render(f, f.area()))
            .unwrap();
        terminal
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_heading_and_body() {
        let app = test_app();
        let mut state = PageViewState::new();
        let text = screen_text(&draw(&app, &mut state));
        assert!(text.contains("Introduction"));
        assert!(text.contains("Welcome to the test book."));
        // Heading has focus on arrival
        assert!(text.contains("▸ Introduction"));
        assert!(state.regions.is_empty());
    }

    #[test]
    fn test_quiz_page_layout() {
        let app = test_app_at(1);
        let mut state = PageViewState::new();
        let text = screen_text(&draw(&app, &mut state));
        assert!(text.contains("Which colour is warm?"));
        assert!(text.contains("( ) Red"));
        assert!(text.contains("[ Check answers ]"));

        let widgets: Vec<_> = state.regions.iter().map(|r| r.widget.clone()).collect();
        assert_eq!(widgets, app.focus_order()[1..].to_vec());
    }

    #[test]
    fn test_selection_and_feedback_drawn_from_tags() {
        let mut app = test_app_at(1);
        update(
            &mut app,
            Action::SelectOption {
                group: "colors".into(),
                option: "red".into(),
            },
            Instant::now(),
        );
        let mut state = PageViewState::new();
        let text = screen_text(&draw(&app, &mut state));
        assert!(text.contains("(✓) Red"));
        assert!(text.contains("Correct!"));
    }

    #[test]
    fn test_sorting_page_zones() {
        let mut app = test_app_at(2);
        update(&mut app, Action::DragStart("run".into()), Instant::now());
        let mut state = PageViewState::new();
        let text = screen_text(&draw(&app, &mut state));
        assert!(text.contains("run (carrying)"));
        assert!(text.contains("Verbs"));
        assert!(text.contains("Drop here"));
        let zone = state
            .regions
            .iter()
            .find(|r| r.widget == WidgetId::zone("nouns"))
            .unwrap();
        assert_eq!(zone.height, ZONE_HEIGHT);
    }

    #[test]
    fn test_hit_test_maps_rows_to_widgets() {
        let app = test_app_at(1);
        let mut state = PageViewState::new();
        draw(&app, &mut state);
        let region = state.regions[0].clone();
        assert_eq!(
            state.hit_test(10, region.top),
            Some(&WidgetId::option("colors", "red"))
        );
        // Heading row is not interactive
        assert_eq!(state.hit_test(10, 0), None);
        // Outside the view
        assert_eq!(state.hit_test(10, 200), None);
    }

    #[test]
    fn test_exiting_page_is_dimmed() {
        let mut app = test_app();
        update(&mut app, Action::Next, Instant::now());
        let mut state = PageViewState::new();
        let terminal = draw(&app, &mut state);
        let cell = &terminal.backend().buffer()[(2, 0)];
        assert!(cell.modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_scroll_to_brings_widget_into_view() {
        let app = test_app_at(1);
        let mut state = PageViewState::new();
        let mut terminal = Terminal::new(TestBackend::new(60, 4)).unwrap();
        terminal
            .draw(|f| PageView::new(&mut state, &app).render(f, f.area()))
            .unwrap();

        state.scroll_to(&WidgetId::CheckButton);
        let region = state
            .regions
            .iter()
            .find(|r| r.widget == WidgetId::CheckButton)
            .unwrap()
            .clone();
        let offset = state.scroll_state.offset().y;
        assert!(region.top >= offset);
        assert!(region.top + region.height <= offset + 4);
    }

    #[test]
    fn test_reset_scrolls_to_top() {
        let app = test_app_at(1);
        let mut state = PageViewState::new();
        let mut terminal = Terminal::new(TestBackend::new(60, 4)).unwrap();
        terminal
            .draw(|f| PageView::new(&mut state, &app).render(f, f.area()))
            .unwrap();
        state.scroll(&TuiEvent::CursorDown);
        assert_eq!(state.scroll_state.offset().y, 1);
        state.reset();
        assert_eq!(state.scroll_state.offset().y, 0);
    }
}
