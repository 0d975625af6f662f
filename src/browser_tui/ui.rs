//! Common UI styles and layout helpers for the browser

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
};

/// Rendering theme, toggled globally with `d`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn base(self) -> Style {
        match self {
            Theme::Dark => Style::default().bg(Color::Black).fg(Color::White),
            Theme::Light => Style::default().bg(Color::White).fg(Color::Black),
        }
    }

    pub fn selected(self) -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title(self) -> Style {
        let fg = match self {
            Theme::Dark => Color::Yellow,
            Theme::Light => Color::Magenta,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn accent(self) -> Style {
        match self {
            Theme::Dark => Style::default().fg(Color::LightRed),
            Theme::Light => Style::default().fg(Color::Red),
        }
    }

    pub fn error(self) -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success(self) -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn info(self) -> Style {
        match self {
            Theme::Dark => Style::default().fg(Color::Cyan),
            Theme::Light => Style::default().fg(Color::Blue),
        }
    }

    pub fn inactive(self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn active_border(self) -> Style {
        match self {
            Theme::Dark => Style::default().fg(Color::Yellow),
            Theme::Light => Style::default().fg(Color::Blue),
        }
    }

    pub fn inactive_border(self) -> Style {
        Style::default().fg(Color::Gray)
    }
}

/// Center a rectangle within another rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Whether a terminal cell lies inside `area`
pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Area inside a one-cell border
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// `main` becomes "Main", `list_institutions` becomes "List Institutions"
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("main"), "Main");
        assert_eq!(title_case("list_institutions"), "List Institutions");
        assert_eq!(title_case("reorder_stages"), "Reorder Stages");
    }

    #[test]
    fn test_contains_and_inner() {
        let area = Rect::new(2, 3, 10, 5);
        assert!(contains(area, 2, 3));
        assert!(!contains(area, 12, 3));
        assert_eq!(inner(area), Rect::new(3, 4, 8, 3));
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }
}
