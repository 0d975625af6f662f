//! Selectable list of records

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::browser_tui::{
    traits::Navigable,
    ui::{self, Theme},
};
use crate::itkdb::{record_label, sort_records, Record};

/// Shown instead of an empty frame
pub const EMPTY_PLACEHOLDER: &str = "❗ Nothing to see here";

/// Configuration for list view rendering
#[derive(Debug, Clone)]
pub struct ListViewConfig {
    pub title: String,
    pub show_index: bool,
}

impl ListViewConfig {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            show_index: false,
        }
    }

    pub fn with_index(mut self) -> Self {
        self.show_index = true;
        self
    }
}

/// One row: a rendered label plus the record it stands for
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledItem {
    pub label: String,
    pub value: Record,
}

impl LabeledItem {
    pub fn new(value: Record) -> Self {
        Self {
            label: record_label(&value),
            value,
        }
    }
}

/// Notification emitted by [`SelectableList::select`]
#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub index: usize,
    pub record: Record,
}

/// Ordered list of records where one can be chosen
pub struct SelectableList {
    items: Vec<LabeledItem>,
    state: ListState,
    config: ListViewConfig,
    focused: bool,
    area: Rect,
}

impl SelectableList {
    pub fn new(config: ListViewConfig) -> Self {
        Self {
            items: Vec::new(),
            state: ListState::default(),
            config,
            focused: false,
            area: Rect::default(),
        }
    }

    /// Replace all items with `records` sorted ascending by `sort_key`
    pub fn populate(&mut self, mut records: Vec<Record>, sort_key: &str) {
        sort_records(&mut records, sort_key);
        self.items = records.into_iter().map(LabeledItem::new).collect();
        *self.state.offset_mut() = 0;
        self.state
            .select(if self.items.is_empty() { None } else { Some(0) });
    }

    pub fn clear(&mut self) {
        self.items.clear();
        *self.state.offset_mut() = 0;
        self.state.select(None);
    }

    /// Select the item at `index`, returning the notification for it
    pub fn select(&mut self, index: usize) -> Option<Selected> {
        let item = self.items.get(index)?;
        self.state.select(Some(index));
        Some(Selected {
            index,
            record: item.value.clone(),
        })
    }

    /// Select whatever is highlighted
    pub fn select_highlighted(&mut self) -> Option<Selected> {
        self.state.selected().and_then(|index| self.select(index))
    }

    /// Move one item to another position, keeping every other item in order
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.state.select(Some(to));
        true
    }

    pub fn items(&self) -> &[LabeledItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [LabeledItem] {
        &mut self.items
    }

    pub fn records(&self) -> Vec<Record> {
        self.items.iter().map(|item| item.value.clone()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Area used by the last render
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Index of the item drawn at a terminal cell, if any
    pub fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = ui::inner(self.area);
        if !ui::contains(inner, column, row) {
            return None;
        }
        let index = self.state.offset() + (row - inner.y) as usize;
        (index < self.items.len()).then_some(index)
    }

    /// Render the list, or the placeholder when it is empty
    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        self.area = area;

        let block = Block::default()
            .title(self.config.title.clone())
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.active_border()
            } else {
                theme.inactive_border()
            });

        if self.items.is_empty() {
            let placeholder = Paragraph::new(EMPTY_PLACEHOLDER)
                .alignment(Alignment::Center)
                .style(theme.inactive())
                .block(block);
            f.render_widget(placeholder, area);
            return;
        }

        let width = ui::inner(area).width as usize;
        let show_index = self.config.show_index;
        let rows: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let content = if show_index {
                    format!("{:>3}. {}", i + 1, item.label)
                } else {
                    item.label.clone()
                };
                ListItem::new(Line::from(Span::styled(
                    truncate_to_width(&content, width),
                    theme.accent(),
                )))
            })
            .collect();

        let list = List::new(rows)
            .block(block)
            .highlight_style(theme.selected());

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

impl Navigable for SelectableList {
    fn navigate_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn navigate_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.state.select(index.filter(|i| *i < self.items.len()));
    }

    fn get_item_count(&self) -> usize {
        self.items.len()
    }
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if (out.as_str().width() + 1) >= width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}
