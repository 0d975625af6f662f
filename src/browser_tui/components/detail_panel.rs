//! Passive display of the currently selected record

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use crate::browser_tui::{traits::Scrollable, ui::Theme};
use crate::itkdb::Record;

pub const EMPTY_DETAIL: &str = "Nothing selected";

pub struct DetailPanel {
    title: String,
    record: Option<Record>,
    lines: Vec<String>,
    scroll_offset: usize,
}

impl DetailPanel {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            record: None,
            lines: vec![EMPTY_DETAIL.to_string()],
            scroll_offset: 0,
        }
    }

    /// Replace whatever is shown with `record`
    pub fn show(&mut self, record: Option<Record>) {
        self.record = record.filter(|r| !r.is_empty());
        self.lines = match &self.record {
            Some(record) => pretty_lines(record),
            None => vec![EMPTY_DETAIL.to_string()],
        };
        self.scroll_offset = 0;
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Rendered text, one entry per line
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let styled: Vec<Line> = self
            .lines
            .iter()
            .map(|line| {
                let style = if self.record.is_none() {
                    theme.inactive()
                } else if line.trim_start().starts_with('"') && line.contains("\":") {
                    theme.info()
                } else {
                    theme.base()
                };
                Line::from(Span::styled(line.clone(), style))
            })
            .collect();

        let paragraph = Paragraph::new(styled)
            .block(
                Block::default()
                    .title(self.title.clone())
                    .borders(Borders::ALL)
                    .border_style(theme.inactive_border()),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset.min(u16::MAX as usize) as u16, 0));

        f.render_widget(paragraph, area);
    }
}

impl Scrollable for DetailPanel {
    fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    fn scroll_down(&mut self, amount: usize) {
        let max_scroll = self.lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + amount).min(max_scroll);
    }

    fn get_scroll_offset(&self) -> usize {
        self.scroll_offset
    }
}

fn pretty_lines(record: &Record) -> Vec<String> {
    let value = Value::Object(record.clone());
    serde_json::to_string_pretty(&value)
        .unwrap_or_else(|_| value.to_string())
        .lines()
        .map(str::to_string)
        .collect()
}
