//! Core traits for the browser screens
//!
//! Every screen draws itself into the body area handed out by the shell and
//! turns terminal events into [`ScreenAction`]s the shell applies.

use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::browser_tui::{app::ScreenId, ui::Theme};

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Switch laterally to another named screen
    SwitchTo(ScreenId),
    /// The login screen holds a freshly authenticated client
    LoggedIn,
    /// Quit the application
    Quit,
    /// Ring the terminal bell
    Bell,
    /// No action taken
    None,
}

/// Core trait for all browser screens
pub trait Screen {
    /// Draw the screen body
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme);

    /// Handle keyboard input and return an action
    async fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction>;

    /// Handle mouse input and return an action
    async fn handle_mouse_event(&mut self, _mouse: MouseEvent) -> Result<ScreenAction> {
        Ok(ScreenAction::None)
    }

    /// Whether printable keys currently go to a text input instead of global bindings
    fn captures_text_input(&self) -> bool {
        false
    }

    /// Called every time the screen becomes active
    async fn on_enter(&mut self) -> Result<ScreenAction> {
        Ok(ScreenAction::None)
    }

    /// Screen specific bindings shown in the footer
    fn key_hints(&self) -> &'static str {
        ""
    }
}

/// Trait for widgets with a movable highlight
pub trait Navigable {
    /// Move highlight up
    fn navigate_up(&mut self);

    /// Move highlight down
    fn navigate_down(&mut self);

    /// Get highlighted index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set highlighted index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}

/// Trait for content that scrolls vertically
pub trait Scrollable {
    fn scroll_up(&mut self, amount: usize);

    fn scroll_down(&mut self, amount: usize);

    fn get_scroll_offset(&self) -> usize;

    fn get_page_size(&self) -> usize {
        10
    }

    fn page_up(&mut self) {
        self.scroll_up(self.get_page_size());
    }

    fn page_down(&mut self) {
        self.scroll_down(self.get_page_size());
    }
}
