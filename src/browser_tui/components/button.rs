//! Clickable button

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::browser_tui::ui::{self, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Default,
    Primary,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Button {
    pub id: String,
    pub label: String,
    pub variant: ButtonVariant,
    pub disabled: bool,
    area: Rect,
}

impl Button {
    pub fn new(id: &str, label: &str, variant: ButtonVariant) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            variant,
            disabled: false,
            area: Rect::default(),
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// True when an enabled button was drawn under this cell
    pub fn hit(&self, column: u16, row: u16) -> bool {
        !self.disabled && ui::contains(self.area, column, row)
    }

    fn style(&self, theme: Theme, focused: bool) -> Style {
        let base = match self.variant {
            ButtonVariant::Default => theme.base(),
            ButtonVariant::Primary => Style::default().bg(Color::Blue).fg(Color::White),
            ButtonVariant::Success => Style::default().bg(Color::Green).fg(Color::Black),
            ButtonVariant::Error => Style::default().bg(Color::Red).fg(Color::White),
        };
        let base = if self.disabled && self.variant == ButtonVariant::Default {
            theme.inactive()
        } else {
            base
        };
        if focused {
            base.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            base
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: Theme, focused: bool) {
        self.area = area;
        let paragraph = Paragraph::new(self.label.clone())
            .alignment(Alignment::Center)
            .style(self.style(theme, focused))
            .block(Block::default().borders(Borders::ALL).border_style(if focused {
                theme.active_border()
            } else {
                theme.inactive_border()
            }));
        f.render_widget(paragraph, area);
    }
}
