//! Conversation history display component

use crate::events::{ChatMessage, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Renders the visible messages, anchored to the bottom. `scroll` counts
/// rows up from the newest line.
pub struct ConversationHistory<'a> {
    messages: &'a [ChatMessage],
    scroll: u16,
    thinking: bool,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a [ChatMessage]) -> Self {
        Self {
            messages,
            scroll: 0,
            thinking: false,
        }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the typing indicator under the last message
    pub fn thinking(mut self, thinking: bool) -> Self {
        self.thinking = thinking;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        for message in self.messages {
            let (label, style) = match message.role {
                Role::User => ("👤 你", Style::default().fg(Color::Blue)),
                Role::Assistant => ("🤖 小码老师", Style::default().fg(Color::Green)),
            };
            lines.push(Line::from(Span::styled(
                label,
                style.add_modifier(Modifier::BOLD),
            )));
            for text in message.content.lines() {
                lines.push(Line::from(vec![Span::raw("  "), Span::raw(text)]));
            }
            lines.push(Line::from(""));
        }

        if self.thinking {
            lines.push(Line::from(Span::styled(
                "🤖 小码老师正在思考...",
                Style::default().fg(Color::Yellow),
            )));
        }
        lines
    }
}

/// Rows a line takes once wrapped to `width` cells; wide (CJK) characters
/// count as two cells.
fn wrapped_rows(line: &Line, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let cells: usize = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars())
        .map(|c| if c.is_ascii() { 1 } else { 2 })
        .sum();
    (cells.div_ceil(width as usize)).max(1) as u16
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 HTML 学习对话");
        let inner = block.inner(area);

        let lines = self.lines();
        let total: u16 = lines
            .iter()
            .map(|line| wrapped_rows(line, inner.width))
            .fold(0u16, u16::saturating_add);
        let bottom = total.saturating_sub(inner.height);
        let offset = bottom.saturating_sub(self.scroll);

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((offset, 0))
            .render(area, buf);
    }
}
