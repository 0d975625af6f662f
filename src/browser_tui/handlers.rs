//! Common event handlers shared by the screens

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::traits::{Navigable, Scrollable};

/// Common keyboard event handling utilities
pub struct CommonKeyHandler;

impl CommonKeyHandler {
    /// Up/Down/Home/End for list-based widgets; true when the key was consumed
    pub fn handle_navigation_keys<T: Navigable>(navigable: &mut T, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::SHIFT) {
            return false;
        }
        match key.code {
            KeyCode::Up => navigable.navigate_up(),
            KeyCode::Down => navigable.navigate_down(),
            KeyCode::Home => navigable.navigate_to_first(),
            KeyCode::End => navigable.navigate_to_last(),
            _ => return false,
        }
        true
    }

    /// PageUp/PageDown for scrollable content
    pub fn handle_scroll_keys<T: Scrollable>(scrollable: &mut T, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::PageUp => scrollable.page_up(),
            KeyCode::PageDown => scrollable.page_down(),
            _ => return false,
        }
        true
    }

    /// Shift+Up/Down or K/J: reorder direction, if the key asks for one
    pub fn reorder_delta(key: KeyEvent) -> Option<i64> {
        match key.code {
            KeyCode::Up if key.modifiers.contains(KeyModifiers::SHIFT) => Some(-1),
            KeyCode::Down if key.modifiers.contains(KeyModifiers::SHIFT) => Some(1),
            KeyCode::Char('K') => Some(-1),
            KeyCode::Char('J') => Some(1),
            _ => None,
        }
    }
}
