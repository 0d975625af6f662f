//! Append-only log area local to a screen

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::browser_tui::ui::Theme;

/// Kinds of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub message: String,
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
}

pub struct TextLog {
    title: String,
    entries: Vec<LogEntry>,
    max_entries: usize,
    show_timestamp: bool,
}

impl Default for TextLog {
    fn default() -> Self {
        Self {
            title: "Log".to_string(),
            entries: Vec::new(),
            max_entries: 500,
            show_timestamp: false,
        }
    }
}

impl TextLog {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamp = true;
        self
    }

    pub fn write(&mut self, level: LogLevel, message: impl Into<String>) {
        self.entries.push(LogEntry {
            message: message.into(),
            level,
            timestamp: Local::now(),
        });
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.write(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.write(LogLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.write(LogLevel::Error, message);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        if self.show_timestamp {
            format!("[{}] {}", entry.timestamp.format("%H:%M:%S"), entry.message)
        } else {
            entry.message.clone()
        }
    }

    /// Render the newest lines that fit
    pub fn render(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(visible);

        let lines: Vec<Line> = self
            .entries
            .iter()
            .skip(skip)
            .map(|entry| {
                let style = match entry.level {
                    LogLevel::Info => theme.info(),
                    LogLevel::Success => theme.success(),
                    LogLevel::Error => theme.error(),
                };
                Line::from(Span::styled(self.format_entry(entry), style))
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(self.title.clone())
                .borders(Borders::ALL)
                .border_style(theme.inactive_border()),
        );

        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_appends_in_order() {
        let mut log = TextLog::new("Log");
        log.error("first");
        log.success("second");
        assert_eq!(log.messages(), vec!["first", "second"]);
        assert_eq!(log.entries()[0].level, LogLevel::Error);
        log.clear();
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = TextLog::new("Log");
        for i in 0..510 {
            log.info(format!("line {}", i));
        }
        assert_eq!(log.entries().len(), 500);
        assert_eq!(log.messages()[0], "line 10");
    }

    #[test]
    fn test_timestamp_prefix() {
        let mut log = TextLog::new("Log").with_timestamps();
        log.info("hello");
        let formatted = log.format_entry(&log.entries()[0]);
        assert!(formatted.starts_with('['));
        assert!(formatted.ends_with("] hello"));
    }
}
