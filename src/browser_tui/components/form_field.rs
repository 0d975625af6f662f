//! Single line text input

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::browser_tui::ui::Theme;

#[derive(Debug, Clone)]
pub struct InputField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub is_focused: bool,
    pub masked: bool,
    /// Cursor position in characters
    pub cursor_position: usize,
    area: Rect,
}

impl InputField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            is_focused: false,
            masked: false,
            cursor_position: 0,
            area: Rect::default(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.value.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.char_len() {
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// What the field shows: the value, masked if needed, or the placeholder
    pub fn display_text(&self) -> String {
        if self.value.is_empty() {
            self.placeholder.clone()
        } else if self.masked {
            "•".repeat(self.char_len())
        } else {
            self.value.clone()
        }
    }

    /// Render the input field as a widget
    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        self.area = area;

        let block = Block::default()
            .title(self.label.as_str())
            .borders(Borders::ALL)
            .border_style(if self.is_focused {
                theme.active_border()
            } else {
                theme.inactive_border()
            });

        let input_style = if self.value.is_empty() {
            theme.inactive()
        } else {
            theme.base()
        };

        let paragraph = Paragraph::new(self.display_text())
            .style(input_style)
            .block(block);

        f.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing() {
        let mut field = InputField::new("Access Code 1");
        for c in "abc".chars() {
            field.insert_char(c);
        }
        field.move_cursor_left();
        field.delete_char();
        assert_eq!(field.value, "ac");
        field.move_cursor_to_start();
        field.delete_char_forward();
        assert_eq!(field.value, "c");
        field.move_cursor_to_end();
        field.insert_char('é');
        field.insert_char('!');
        assert_eq!(field.value, "cé!");
        field.delete_char();
        assert_eq!(field.value, "cé");
    }

    #[test]
    fn test_masked_display() {
        let field = InputField::new("Access Code 2")
            .with_placeholder("code")
            .masked();
        assert_eq!(field.display_text(), "code");
        let field = field.with_value("secret");
        assert_eq!(field.display_text(), "••••••");
        assert_eq!(field.value, "secret");
    }
}
