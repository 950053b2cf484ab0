#[cfg(test)]
#[path = "chat_log_test.rs"]
mod tests;

use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::domain::models::ChatMessage;
use crate::domain::models::MessageType;

/// Rendered lines for one message, kept in the same order as the messages.
struct LogEntry {
    message: ChatMessage,
    lines: Vec<Line<'static>>,
}

/// The scrollable chat log of a study session. Live messages are appended at
/// the end, history pages are inserted in front of the oldest message, so the
/// log always reads oldest to newest.
pub struct ChatLog {
    entries: Vec<LogEntry>,
    line_width: usize,
    lines_len: usize,
}

impl Default for ChatLog {
    fn default() -> ChatLog {
        return ChatLog::new();
    }
}

fn message_lines(message: &ChatMessage, line_width: usize) -> Vec<Line<'static>> {
    let mut header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut text_style = Style::default();
    if message.message_type() == MessageType::Error {
        header_style = header_style.fg(Color::Red);
        text_style = text_style.fg(Color::Red);
    }

    let mut lines = vec![Line::from(Span::styled(message.header(), header_style))];
    lines.extend(
        message
            .as_string_lines(line_width.max(1))
            .into_iter()
            .map(|line| {
                return Line::from(Span::styled(line, text_style));
            }),
    );
    lines.push(Line::from(""));

    return lines;
}

impl ChatLog {
    pub fn new() -> ChatLog {
        return ChatLog {
            entries: vec![],
            line_width: 0,
            lines_len: 0,
        };
    }

    fn entry(&self, message: ChatMessage) -> LogEntry {
        let lines = message_lines(&message, self.line_width);
        return LogEntry { message, lines };
    }

    pub fn set_width(&mut self, line_width: usize) {
        if self.line_width == line_width {
            return;
        }

        self.line_width = line_width;
        for entry in self.entries.iter_mut() {
            entry.lines = message_lines(&entry.message, line_width);
        }
        self.lines_len = self
            .entries
            .iter()
            .map(|entry| {
                return entry.lines.len();
            })
            .sum();
    }

    /// Adds a message after the newest one. Returns the number of rendered
    /// lines it takes.
    pub fn append(&mut self, message: ChatMessage) -> usize {
        let entry = self.entry(message);
        let added = entry.lines.len();
        self.entries.push(entry);
        self.lines_len += added;

        return added;
    }

    /// Inserts a page of older messages, already ordered oldest first, right
    /// before the oldest message in the log. Returns the number of rendered
    /// lines added above the previous content.
    pub fn prepend_page(&mut self, messages: Vec<ChatMessage>) -> usize {
        let page = messages
            .into_iter()
            .map(|message| {
                return self.entry(message);
            })
            .collect::<Vec<LogEntry>>();

        let added = page
            .iter()
            .map(|entry| {
                return entry.lines.len();
            })
            .sum::<usize>();

        self.entries.splice(0..0, page);
        self.lines_len += added;

        return added;
    }

    pub fn messages(&self) -> Vec<&ChatMessage> {
        return self
            .entries
            .iter()
            .map(|entry| {
                return &entry.message;
            })
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Total rendered lines.
    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        return self
            .entries
            .iter()
            .flat_map(|entry| {
                return entry.lines.to_owned();
            })
            .collect();
    }

    pub fn render(&self, frame: &mut Frame, rect: Rect, title: &str, scroll: u16) {
        frame.render_widget(
            Paragraph::new(self.lines())
                .block(Block::default().borders(Borders::TOP).title(title.to_string()))
                .scroll((scroll, 0)),
            rect,
        );
    }
}
