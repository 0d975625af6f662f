//! Navigation bar listing every named screen

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::browser_tui::{
    app::ScreenId,
    components::button::{Button, ButtonVariant},
    ui::{title_case, Theme},
};

pub struct NavBar {
    entries: Vec<(ScreenId, Button)>,
}

impl NavBar {
    /// One control per screen with a navigable name, in registry order.
    /// The active screen's control is present but disabled.
    pub fn build(screens: &[ScreenId], active: ScreenId) -> Self {
        let entries = screens
            .iter()
            .filter_map(|&screen| {
                let name = screen.name()?;
                let is_current = screen == active;
                let button = Button::new(
                    name,
                    &title_case(name),
                    if is_current {
                        ButtonVariant::Primary
                    } else {
                        ButtonVariant::Default
                    },
                )
                .disabled(is_current);
                Some((screen, button))
            })
            .collect();
        Self { entries }
    }

    pub fn controls(&self) -> impl Iterator<Item = (ScreenId, &Button)> {
        self.entries.iter().map(|(screen, button)| (*screen, button))
    }

    /// Digit hotkeys: `1` is the first control
    pub fn hotkey(&self, c: char) -> Option<ScreenId> {
        let index = c.to_digit(10)?.checked_sub(1)? as usize;
        self.entries
            .get(index)
            .filter(|(_, button)| !button.disabled)
            .map(|(screen, _)| *screen)
    }

    pub fn click(&self, column: u16, row: u16) -> Option<ScreenId> {
        self.entries
            .iter()
            .find(|(_, button)| button.hit(column, row))
            .map(|(screen, _)| *screen)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        if self.entries.is_empty() {
            return;
        }
        let constraints: Vec<Constraint> = self
            .entries
            .iter()
            .map(|(_, button)| Constraint::Length(button.label.chars().count() as u16 + 6))
            .chain(std::iter::once(Constraint::Min(0)))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, (_, button)) in self.entries.iter_mut().enumerate() {
            button.render(f, chunks[i], theme, false);
        }
    }
}
