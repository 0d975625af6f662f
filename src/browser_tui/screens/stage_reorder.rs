//! Stage reorder screen: pick a project and a component type, then reorder its
//! stages by dragging or with the keyboard and save the new orders

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::browser_tui::{
    components::{
        Button, ButtonVariant, DragEvent, DraggableList, ListViewConfig, SelectableList, TextLog,
    },
    handlers::CommonKeyHandler,
    traits::{Navigable, Screen, ScreenAction},
    ui::Theme,
};
use crate::itkdb::{record_label, record_str, DatabaseClient, ItkdbApi, Record, StageUpdate};

pub const FALLBACK_PROJECT: &str = "P";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Projects,
    Types,
    Stages,
}

pub struct StageReorderScreen {
    client: Arc<dyn DatabaseClient>,
    projects: Vec<(String, Button)>,
    project: String,
    /// Highlighted project button while the projects pane has focus
    project_cursor: usize,
    types_by_project: HashMap<String, Vec<Record>>,
    types: SelectableList,
    stages: DraggableList,
    component_type: Option<Record>,
    save_button: Button,
    reset_button: Button,
    log: TextLog,
    focus: Pane,
}

impl StageReorderScreen {
    pub fn new(client: Arc<dyn DatabaseClient>, projects: &[Record], default_project: &str) -> Self {
        let projects: Vec<(String, Button)> = projects
            .iter()
            .filter_map(|project| {
                let code = record_str(project, "code")?;
                let button = Button::new(&code, &record_label(project), ButtonVariant::Default);
                Some((code, button))
            })
            .collect();
        let project_cursor = projects
            .iter()
            .position(|(code, _)| code == default_project)
            .unwrap_or(0);

        let mut types = SelectableList::new(ListViewConfig::new("Component Types"));
        types.set_focus(true);

        let mut screen = Self {
            client,
            projects,
            project: default_project.to_string(),
            project_cursor,
            types_by_project: HashMap::new(),
            types,
            stages: DraggableList::new(ListViewConfig::new("Stages").with_index(), "order"),
            component_type: None,
            save_button: Button::new("save", "Save", ButtonVariant::Success),
            reset_button: Button::new("reset", "Reset", ButtonVariant::Error),
            log: TextLog::new("Log"),
            focus: Pane::Types,
        };
        screen.highlight_project();
        screen
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn types(&self) -> &SelectableList {
        &self.types
    }

    pub fn stages(&self) -> &DraggableList {
        &self.stages
    }

    pub fn log(&self) -> &TextLog {
        &self.log
    }

    fn highlight_project(&mut self) {
        for (code, button) in self.projects.iter_mut() {
            button.variant = if *code == self.project {
                ButtonVariant::Primary
            } else {
                ButtonVariant::Default
            };
        }
    }

    /// Make `code` the current project and show its component types
    pub async fn switch_project(&mut self, code: &str) -> ScreenAction {
        info!("Switching to project {}", code);
        self.project = code.to_string();
        if let Some(position) = self.projects.iter().position(|(c, _)| c == code) {
            self.project_cursor = position;
        }
        self.highlight_project();
        self.load_types().await
    }

    /// Component types of the current project, fetched once per project
    pub async fn load_types(&mut self) -> ScreenAction {
        self.component_type = None;
        self.stages.clear();

        if !self.types_by_project.contains_key(&self.project) {
            let params = json!({ "project": self.project });
            match self.client.get(ItkdbApi::LIST_COMPONENT_TYPES, params).await {
                Ok(types) => {
                    info!(
                        "Loaded {} component types for project {}",
                        types.len(),
                        self.project
                    );
                    self.types_by_project.insert(self.project.clone(), types);
                }
                Err(e) => {
                    warn!("Could not list component types: {}", e);
                    self.types.clear();
                    self.log.error(e.to_string());
                    return ScreenAction::Bell;
                }
            }
        }

        let types = self
            .types_by_project
            .get(&self.project)
            .cloned()
            .unwrap_or_default();
        self.types.populate(types, "name");
        ScreenAction::None
    }

    /// Choose a component type and show its stages
    pub fn select_type(&mut self, index: usize) {
        let Some(selected) = self.types.select(index) else {
            return;
        };
        let stages = stage_records(&selected.record);
        debug!(
            "Selected component type {} with {} stages",
            record_label(&selected.record),
            stages.len()
        );
        self.stages.rebuild(stages);
        self.component_type = Some(selected.record);
    }

    /// Persist every stage whose position changed
    pub async fn save(&mut self) -> ScreenAction {
        self.log.clear();
        let Some(component_type) = self.component_type.as_ref() else {
            self.log.info("Select a component type first");
            return ScreenAction::None;
        };
        let type_id = record_str(component_type, "id").unwrap_or_default();

        let client = self.client.clone();
        let changes = self
            .stages
            .commit_order(|stage, order| {
                let client = client.clone();
                let update = StageUpdate {
                    id: type_id.clone(),
                    code: record_str(&stage, "code").unwrap_or_default(),
                    name: record_str(&stage, "name").unwrap_or_default(),
                    order,
                };
                async move {
                    let body = serde_json::to_value(&update)?;
                    client
                        .post(ItkdbApi::UPDATE_COMPONENT_TYPE_STAGE, body)
                        .await
                        .map(|_| ())
                }
            })
            .await;

        let mut failed = false;
        for change in &changes {
            if change.succeeded() {
                self.log.success(change.describe());
            } else {
                failed = true;
                self.log.error(change.describe());
            }
        }
        info!(
            "Saved stage order of {}: {} changes, {} failed",
            type_id,
            changes.len(),
            changes.iter().filter(|c| !c.succeeded()).count()
        );

        self.store_stages(&type_id);
        if failed {
            ScreenAction::Bell
        } else {
            ScreenAction::None
        }
    }

    /// Write the list's current orders back into the cached component type
    fn store_stages(&mut self, type_id: &str) {
        let stages = Value::Array(
            self.stages
                .list
                .records()
                .into_iter()
                .map(Value::Object)
                .collect(),
        );
        if let Some(component_type) = self.component_type.as_mut() {
            component_type.insert("stages".to_string(), stages.clone());
        }
        for item in self.types.items_mut() {
            if has_id(&item.value, type_id) {
                item.value.insert("stages".to_string(), stages.clone());
            }
        }
        if let Some(cached) = self.types_by_project.get_mut(&self.project) {
            for record in cached.iter_mut() {
                if has_id(record, type_id) {
                    record.insert("stages".to_string(), stages.clone());
                }
            }
        }
    }

    /// Throw away unsaved moves
    pub fn reset(&mut self) {
        let saved = self
            .component_type
            .as_ref()
            .map(stage_records)
            .unwrap_or_default();
        self.stages.rebuild(saved);
    }

    fn set_focus(&mut self, focus: Pane) {
        self.focus = focus;
        self.types.set_focus(focus == Pane::Types);
        self.stages.list.set_focus(focus == Pane::Stages);
    }

    fn cycle_focus(&mut self) {
        let next = match self.focus {
            Pane::Projects => Pane::Types,
            Pane::Types => Pane::Stages,
            Pane::Stages => Pane::Projects,
        };
        self.set_focus(next);
    }
}

fn has_id(record: &Record, id: &str) -> bool {
    record_str(record, "id").as_deref() == Some(id)
}

fn stage_records(component_type: &Record) -> Vec<Record> {
    component_type
        .get("stages")
        .and_then(Value::as_array)
        .map(|stages| stages.iter().filter_map(Value::as_object).cloned().collect())
        .unwrap_or_default()
}

impl Screen for StageReorderScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);

        let mut constraints: Vec<Constraint> = self
            .projects
            .iter()
            .map(|(_, button)| Constraint::Length(button.label.chars().count() as u16 + 6))
            .collect();
        constraints.push(Constraint::Min(0));
        let project_cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(rows[0]);
        let projects_focused = self.focus == Pane::Projects;
        for (i, (_, button)) in self.projects.iter_mut().enumerate() {
            let focused = projects_focused && i == self.project_cursor;
            button.render(f, project_cells[i], theme, focused);
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[1]);
        self.types.render(f, columns[0], theme);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(8),
            ])
            .split(columns[1]);
        self.stages.render(f, right[0], theme);

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Min(0),
            ])
            .split(right[1]);
        self.save_button.render(f, buttons[0], theme, false);
        self.reset_button.render(f, buttons[1], theme, false);

        self.log.render(f, right[2], theme);
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Tab => {
                self.cycle_focus();
                return Ok(ScreenAction::None);
            }
            KeyCode::Char('s') => return Ok(self.save().await),
            KeyCode::Char('x') => {
                self.reset();
                return Ok(ScreenAction::None);
            }
            _ => {}
        }

        match self.focus {
            Pane::Projects => match key.code {
                KeyCode::Left => self.project_cursor = self.project_cursor.saturating_sub(1),
                KeyCode::Right if self.project_cursor + 1 < self.projects.len() => {
                    self.project_cursor += 1
                }
                KeyCode::Enter => {
                    if let Some((code, _)) = self.projects.get(self.project_cursor) {
                        let code = code.clone();
                        return Ok(self.switch_project(&code).await);
                    }
                }
                _ => {}
            },
            Pane::Types => {
                if !CommonKeyHandler::handle_navigation_keys(&mut self.types, key)
                    && key.code == KeyCode::Enter
                {
                    if let Some(index) = self.types.get_selected_index() {
                        self.select_type(index);
                        self.set_focus(Pane::Stages);
                    }
                }
            }
            Pane::Stages => {
                if let Some(delta) = CommonKeyHandler::reorder_delta(key) {
                    self.stages.move_highlighted(delta);
                } else {
                    CommonKeyHandler::handle_navigation_keys(&mut self.stages.list, key);
                }
            }
        }
        Ok(ScreenAction::None)
    }

    async fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<ScreenAction> {
        let (column, row) = (mouse.column, mouse.row);
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            if let Some(code) = self
                .projects
                .iter()
                .find(|(_, button)| button.hit(column, row))
                .map(|(code, _)| code.clone())
            {
                return Ok(self.switch_project(&code).await);
            }
            if self.save_button.hit(column, row) {
                return Ok(self.save().await);
            }
            if self.reset_button.hit(column, row) {
                self.reset();
                return Ok(ScreenAction::None);
            }
            if let Some(index) = self.types.item_at(column, row) {
                self.set_focus(Pane::Types);
                self.select_type(index);
                return Ok(ScreenAction::None);
            }
        }

        match self.stages.handle_mouse(mouse) {
            Some(DragEvent::DragStarted { .. }) | Some(DragEvent::Clicked(_)) => {
                self.set_focus(Pane::Stages)
            }
            Some(event) => debug!("{:?}", event),
            None => {}
        }
        Ok(ScreenAction::None)
    }

    async fn on_enter(&mut self) -> Result<ScreenAction> {
        if self.types_by_project.contains_key(&self.project) {
            return Ok(ScreenAction::None);
        }
        Ok(self.load_types().await)
    }

    fn key_hints(&self) -> &'static str {
        "Tab: pane | Enter: choose | Shift+↑/↓ or K/J: move stage | s: save | x: reset"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itkdb::{record_i64, testing::{record, FakeClient}};
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn projects() -> Vec<Record> {
        vec![
            record(json!({"code": "P", "name": "Pixels"})),
            record(json!({"code": "S", "name": "Strips"})),
        ]
    }

    fn component_types() -> Vec<Record> {
        vec![
            record(json!({
                "id": "ct-module", "code": "MODULE", "name": "Module",
                "stages": [
                    {"code": "TEST", "name": "Testing", "order": 3},
                    {"code": "ASSY", "name": "Assembly", "order": 1},
                    {"code": "BOND", "name": "Bonding", "order": 2}
                ]
            })),
            record(json!({"id": "ct-hybrid", "code": "HYBRID", "name": "Hybrid", "stages": []})),
        ]
    }

    async fn screen(fake: Arc<FakeClient>) -> StageReorderScreen {
        let mut screen = StageReorderScreen::new(fake, &projects(), "S");
        screen.on_enter().await.unwrap();
        // types sorted by name: Hybrid, Module
        screen.select_type(1);
        screen
    }

    fn client() -> Arc<FakeClient> {
        Arc::new(FakeClient::new().with_response(ItkdbApi::LIST_COMPONENT_TYPES, component_types()))
    }

    fn stage_codes(screen: &StageReorderScreen) -> Vec<String> {
        screen
            .stages()
            .list
            .items()
            .iter()
            .map(|item| record_str(&item.value, "code").unwrap())
            .collect()
    }

    fn stage_orders(screen: &StageReorderScreen) -> Vec<i64> {
        screen
            .stages()
            .list
            .items()
            .iter()
            .map(|item| record_i64(&item.value, "order").unwrap())
            .collect()
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    #[tokio::test]
    async fn test_types_loaded_for_default_project() {
        let fake = client();
        let screen = screen(fake.clone()).await;
        assert_eq!(screen.project(), "S");
        assert_eq!(screen.types().labels(), vec!["Hybrid", "Module"]);
        assert_eq!(stage_codes(&screen), vec!["ASSY", "BOND", "TEST"]);
        let calls = fake.calls_to(ItkdbApi::LIST_COMPONENT_TYPES);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload, json!({"project": "S"}));
    }

    #[tokio::test]
    async fn test_component_types_cached_per_project() {
        let fake = client();
        let mut screen = screen(fake.clone()).await;
        screen.switch_project("P").await;
        screen.switch_project("S").await;
        screen.on_enter().await.unwrap();
        let projects: Vec<Value> = fake
            .calls_to(ItkdbApi::LIST_COMPONENT_TYPES)
            .into_iter()
            .map(|call| call.payload["project"].clone())
            .collect();
        assert_eq!(projects, vec![json!("S"), json!("P")]);
        assert!(screen.stages().list.is_empty());
    }

    #[tokio::test]
    async fn test_keyboard_reorder_and_save() {
        let fake = client();
        let mut screen = screen(fake.clone()).await;
        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).await.unwrap();
        // highlight Testing and move it to the top
        screen.handle_key_event(KeyEvent::from(KeyCode::End)).await.unwrap();
        screen.handle_key_event(shift(KeyCode::Up)).await.unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Char('K'))).await.unwrap();
        assert_eq!(stage_codes(&screen), vec!["TEST", "ASSY", "BOND"]);

        let action = screen.handle_key_event(KeyEvent::from(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(action, ScreenAction::None);
        assert_eq!(stage_orders(&screen), vec![1, 2, 3]);
        assert_eq!(
            screen.log().messages(),
            vec![
                "✓ Testing: 3 ▶ 1",
                "✓ Assembly: 1 ▶ 2",
                "✓ Bonding: 2 ▶ 3",
            ]
        );

        let posts = fake.calls_to(ItkdbApi::UPDATE_COMPONENT_TYPE_STAGE);
        assert_eq!(posts.len(), 3);
        assert_eq!(
            posts[0].payload,
            json!({"id": "ct-module", "code": "TEST", "name": "Testing", "order": 1})
        );

        // saved orders survive reselecting the type
        screen.select_type(0);
        screen.select_type(1);
        assert_eq!(stage_codes(&screen), vec!["TEST", "ASSY", "BOND"]);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported() {
        let fake = client();
        fake.fail_stage("ASSY");
        let mut screen = screen(fake.clone()).await;
        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).await.unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Char('J'))).await.unwrap();
        assert_eq!(stage_codes(&screen), vec!["BOND", "ASSY", "TEST"]);

        let action = screen.save().await;
        assert_eq!(action, ScreenAction::Bell);
        let messages = screen.log().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "✓ Bonding: 2 ▶ 1");
        assert!(messages[1].starts_with("✗ Assembly: 1 ▶ 2 ("));
        // the failed stage keeps its old order
        assert_eq!(stage_orders(&screen), vec![1, 1, 3]);

        fake.heal();
        assert_eq!(screen.save().await, ScreenAction::None);
        assert_eq!(screen.log().messages(), vec!["✓ Assembly: 1 ▶ 2"]);
        assert_eq!(stage_orders(&screen), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_reset_restores_saved_order() {
        let mut screen = screen(client()).await;
        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).await.unwrap();
        screen.handle_key_event(shift(KeyCode::Down)).await.unwrap();
        screen.handle_key_event(shift(KeyCode::Down)).await.unwrap();
        assert_eq!(stage_codes(&screen), vec!["BOND", "TEST", "ASSY"]);

        screen.handle_key_event(KeyEvent::from(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(stage_codes(&screen), vec!["ASSY", "BOND", "TEST"]);
    }

    #[tokio::test]
    async fn test_reset_with_tied_orders() {
        let fake = Arc::new(FakeClient::new().with_response(
            ItkdbApi::LIST_COMPONENT_TYPES,
            vec![record(json!({
                "id": "ct-tied", "code": "TIED", "name": "Tied",
                "stages": [
                    {"code": "A", "name": "A", "order": 1},
                    {"code": "B", "name": "B", "order": 1},
                    {"code": "C", "name": "C", "order": 2}
                ]
            }))],
        ));
        let mut screen = StageReorderScreen::new(fake, &projects(), "S");
        screen.on_enter().await.unwrap();
        screen.select_type(0);
        assert_eq!(stage_codes(&screen), vec!["A", "B", "C"]);

        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).await.unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Down)).await.unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Char('K'))).await.unwrap();
        assert_eq!(stage_codes(&screen), vec!["B", "A", "C"]);

        screen.reset();
        assert_eq!(stage_codes(&screen), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_reset_after_partial_save_keeps_saved_moves_only() {
        let fake = client();
        fake.fail_stage("ASSY");
        let mut screen = screen(fake).await;
        screen.handle_key_event(KeyEvent::from(KeyCode::Tab)).await.unwrap();
        screen.handle_key_event(KeyEvent::from(KeyCode::Char('J'))).await.unwrap();
        screen.save().await;
        // BOND saved as 1, ASSY still 1: both tie, list order is what was stored
        assert_eq!(stage_codes(&screen), vec!["BOND", "ASSY", "TEST"]);

        screen.handle_key_event(KeyEvent::from(KeyCode::Char('J'))).await.unwrap();
        assert_eq!(stage_codes(&screen), vec!["BOND", "TEST", "ASSY"]);
        screen.reset();
        assert_eq!(stage_codes(&screen), vec!["BOND", "ASSY", "TEST"]);
    }

    #[tokio::test]
    async fn test_mouse_drag_reorders_stages() {
        let mut screen = screen(client()).await;
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| screen.draw(f, f.size(), Theme::Dark))
            .unwrap();

        let area = screen.stages().list.area();
        let (column, top) = (area.x + 2, area.y + 1);
        let event = |kind, row| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        for mouse in [
            event(MouseEventKind::Down(MouseButton::Left), top),
            event(MouseEventKind::Drag(MouseButton::Left), top + 1),
            event(MouseEventKind::Drag(MouseButton::Left), top + 3),
            event(MouseEventKind::Up(MouseButton::Left), top + 3),
        ] {
            screen.handle_mouse_event(mouse).await.unwrap();
        }
        assert_eq!(stage_codes(&screen), vec!["BOND", "TEST", "ASSY"]);
    }

    #[tokio::test]
    async fn test_failed_type_listing_rings_bell() {
        let fake = client();
        fake.fail_endpoint(ItkdbApi::LIST_COMPONENT_TYPES);
        let mut screen = StageReorderScreen::new(fake.clone(), &projects(), "S");
        assert_eq!(screen.on_enter().await.unwrap(), ScreenAction::Bell);
        assert_eq!(screen.log().entries().len(), 1);

        fake.heal();
        screen.on_enter().await.unwrap();
        assert_eq!(screen.types().len(), 2);
    }
}
