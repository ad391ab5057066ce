//! Page body markdown → ratatui `Text`.
//!
//! Walks `pulldown_cmark` events and builds styled lines. Covers what book
//! pages use: sub-headings, emphasis, inline and block code, bullet and
//! numbered lists, block quotes, rules, and links.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const QUOTE_BAR: &str = "┃ ";
const CODE_INDENT: &str = "    ";
const RULE_WIDTH: usize = 32;

/// Render a page body. `base` is the style of plain text.
pub fn render(body: &str, base: Style) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = TextBuilder::new(base);
    for event in Parser::new_ext(body, opts) {
        builder.feed(event);
    }
    builder.finish()
}

struct TextBuilder {
    lines: Vec<Line<'static>>,
    base: Style,
    /// Inline styles, innermost last. Each entry is already patched onto
    /// its parent.
    inline: Vec<Style>,
    /// Spans repeated at the start of every line (quote bars, code indent).
    gutters: Vec<Span<'static>>,
    /// Open lists: `None` for bullets, `Some(n)` for the next number.
    lists: Vec<Option<u64>>,
    in_code: bool,
    pending_url: Option<String>,
    /// A finished block is waiting for a separating blank line.
    gap: bool,
}

impl TextBuilder {
    fn new(base: Style) -> Self {
        Self {
            lines: Vec::new(),
            base,
            inline: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            in_code: false,
            pending_url: None,
            gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn enter_style(&mut self, style: Style) {
        let next = self.current().patch(style);
        self.inline.push(next);
    }

    fn leave_style(&mut self) {
        self.inline.pop();
    }

    fn new_line(&mut self) {
        let spans: Vec<Span<'static>> = self.gutters.clone();
        self.lines.push(Line::from(spans));
    }

    fn append(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn start_block(&mut self) {
        if self.gap {
            self.new_line();
            self.gap = false;
        }
    }

    fn feed(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.append(Span::styled(
                code.to_string(),
                Style::default().fg(Color::Yellow),
            )),
            Event::SoftBreak => self.append(Span::styled(" ", self.current())),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.new_line();
                self.append(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(Color::DarkGray),
                ));
                self.gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.start_block();
                // List items open their own line
                if self.lists.is_empty() {
                    self.new_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                self.enter_style(sub_heading(level));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters
                    .push(Span::styled(QUOTE_BAR, Style::default().fg(Color::DarkGray)));
                self.enter_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.gutters.push(Span::raw(CODE_INDENT));
                self.in_code = true;
            }
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(first);
            }
            Tag::Item => {
                self.gap = false;
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.append(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.enter_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.enter_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.enter_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.pending_url = Some(dest_url.to_string());
                self.enter_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.gap = true,
            TagEnd::Heading(_) => {
                self.leave_style();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.leave_style();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.gutters.pop();
                self.in_code = false;
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.leave_style(),
            TagEnd::Link => {
                self.leave_style();
                if let Some(url) = self.pending_url.take() {
                    self.append(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        // ratatui draws tabs as zero width
        let text = text.replace('\t', CODE_INDENT);
        if self.in_code {
            let style = Style::default().fg(Color::Gray);
            for line in text.lines() {
                self.new_line();
                self.append(Span::styled(line.to_owned(), style));
            }
            return;
        }
        let style = self.current();
        self.append(Span::styled(text, style));
    }
}

fn sub_heading(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => style.fg(Color::Cyan),
        _ => style.add_modifier(Modifier::ITALIC),
    }
}
