//! Institution browser: list on the left, details of the selected one on the right

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use serde_json::json;
use tracing::{info, warn};

use crate::browser_tui::{
    components::{DetailPanel, ListViewConfig, SelectableList, Selected, TextLog},
    handlers::CommonKeyHandler,
    traits::{Navigable, Screen, ScreenAction},
    ui::Theme,
};
use crate::itkdb::{DatabaseClient, ItkdbApi};

pub struct InstitutionScreen {
    client: Arc<dyn DatabaseClient>,
    list: SelectableList,
    detail: DetailPanel,
    log: TextLog,
    loaded: bool,
}

impl InstitutionScreen {
    pub fn new(client: Arc<dyn DatabaseClient>) -> Self {
        let mut list = SelectableList::new(ListViewConfig::new("Institutions"));
        list.set_focus(true);
        Self {
            client,
            list,
            detail: DetailPanel::new("Institution"),
            log: TextLog::new("Log"),
            loaded: false,
        }
    }

    pub fn list(&self) -> &SelectableList {
        &self.list
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn log(&self) -> &TextLog {
        &self.log
    }

    /// Fetch all institutions, sorted by name
    pub async fn load(&mut self) -> ScreenAction {
        match self
            .client
            .get(ItkdbApi::LIST_INSTITUTIONS, json!({}))
            .await
        {
            Ok(institutions) => {
                info!("Loaded {} institutions", institutions.len());
                self.list.populate(institutions, "name");
                self.detail.show(None);
                self.loaded = true;
                ScreenAction::None
            }
            Err(e) => {
                warn!("Could not list institutions: {}", e);
                self.log.error(e.to_string());
                ScreenAction::Bell
            }
        }
    }

    /// Select item `index` and show it
    pub fn select(&mut self, index: usize) {
        if let Some(Selected { record, .. }) = self.list.select(index) {
            self.detail.show(Some(record));
        }
    }
}

impl Screen for InstitutionScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let has_log = !self.log.entries().is_empty();
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(if has_log { 5 } else { 0 }),
            ])
            .split(columns[0]);

        self.list.render(f, left[0], theme);
        if has_log {
            self.log.render(f, left[1], theme);
        }
        self.detail.render(f, columns[1], theme);
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        if CommonKeyHandler::handle_navigation_keys(&mut self.list, key)
            || CommonKeyHandler::handle_scroll_keys(&mut self.detail, key)
        {
            return Ok(ScreenAction::None);
        }
        match key.code {
            KeyCode::Enter => {
                if let Some(index) = self.list.get_selected_index() {
                    self.select(index);
                }
            }
            KeyCode::Char('r') => return Ok(self.load().await),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    async fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<ScreenAction> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.list.item_at(mouse.column, mouse.row) {
                    self.select(index);
                }
            }
            MouseEventKind::ScrollUp => self.list.navigate_up(),
            MouseEventKind::ScrollDown => self.list.navigate_down(),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    async fn on_enter(&mut self) -> Result<ScreenAction> {
        if self.loaded {
            return Ok(ScreenAction::None);
        }
        Ok(self.load().await)
    }

    fn key_hints(&self) -> &'static str {
        "↑/↓: move | Enter: show | r: reload"
    }
}
