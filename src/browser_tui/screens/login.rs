//! Login screen: exchanges the two access codes for a session

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders},
    Frame,
};
use tracing::{info, warn};

use crate::browser_tui::{
    components::{Button, ButtonVariant, InputField, TextLog},
    traits::{Screen, ScreenAction},
    ui::{self, Theme},
};
use crate::itkdb::{Authenticator, DatabaseClient, FailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    AwaitingInput,
    Submitting,
    Authenticated,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Code1,
    Code2,
    Button,
}

pub struct LoginScreen {
    authenticator: Arc<dyn Authenticator>,
    code1: InputField,
    code2: InputField,
    login_button: Button,
    focus: Focus,
    editing: bool,
    state: LoginState,
    log: TextLog,
    client: Option<Arc<dyn DatabaseClient>>,
}

impl LoginScreen {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        access_code1: Option<&str>,
        access_code2: Option<&str>,
    ) -> Self {
        let mut code1 = InputField::new("Access Code 1")
            .with_placeholder("code")
            .with_value(access_code1.unwrap_or_default())
            .masked();
        code1.set_focus(true);
        let code2 = InputField::new("Access Code 2")
            .with_placeholder("code")
            .with_value(access_code2.unwrap_or_default())
            .masked();

        Self {
            authenticator,
            code1,
            code2,
            login_button: Button::new("login", "Login", ButtonVariant::Primary),
            focus: Focus::Code1,
            editing: true,
            state: LoginState::AwaitingInput,
            log: TextLog::new("Log").with_timestamps(),
            client: None,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn log(&self) -> &TextLog {
        &self.log
    }

    /// Hand the authenticated client over to the shell
    pub fn take_client(&mut self) -> Option<Arc<dyn DatabaseClient>> {
        self.client.take()
    }

    pub fn set_codes(&mut self, code1: &str, code2: &str) {
        self.code1 = self.code1.clone().with_value(code1);
        self.code2 = self.code2.clone().with_value(code2);
    }

    /// Try to authenticate with whatever is currently entered
    pub async fn submit(&mut self) -> ScreenAction {
        self.state = LoginState::Submitting;
        match self
            .authenticator
            .authenticate(&self.code1.value, &self.code2.value)
            .await
        {
            Ok(client) => {
                info!("Login succeeded for {}", client.session().identity);
                self.client = Some(client);
                self.state = LoginState::Authenticated;
                ScreenAction::LoggedIn
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                let reason = match e.kind() {
                    FailureKind::AuthenticationFailure => "Login rejected",
                    FailureKind::RequestFailure => "Login request failed",
                };
                self.fail(format!("{}: {}", reason, e));
                ScreenAction::Bell
            }
        }
    }

    /// Record a failed attempt in the log and leave the screen awaiting a retry
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.client = None;
        self.log.error(reason);
        self.state = LoginState::Failed;
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.editing = focus != Focus::Button;
        self.code1.set_focus(focus == Focus::Code1);
        self.code2.set_focus(focus == Focus::Code2);
    }

    fn next_focus(&mut self, forward: bool) {
        let order = [Focus::Code1, Focus::Code2, Focus::Button];
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.set_focus(order[next]);
    }

    fn focused_field(&mut self) -> Option<&mut InputField> {
        if !self.editing {
            return None;
        }
        match self.focus {
            Focus::Code1 => Some(&mut self.code1),
            Focus::Code2 => Some(&mut self.code2),
            Focus::Button => None,
        }
    }
}

impl Screen for LoginScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(13), Constraint::Length(8)])
            .split(area);

        let dialog = ui::centered_rect(60, 80, chunks[0]);
        let block = Block::default()
            .title("Login to the ITk production database")
            .borders(Borders::ALL)
            .border_style(theme.active_border());
        f.render_widget(block, dialog);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(ui::inner(dialog));

        self.code1.render(f, rows[0], theme);
        self.code2.render(f, rows[1], theme);

        let button_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(12),
                Constraint::Min(0),
            ])
            .split(rows[2]);
        let focused = self.focus == Focus::Button;
        self.login_button.render(f, button_row[1], theme, focused);

        self.log.render(f, chunks[1], theme);
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Tab => self.next_focus(true),
            KeyCode::BackTab => self.next_focus(false),
            KeyCode::Enter => return Ok(self.submit().await),
            KeyCode::Esc => self.editing = false,
            KeyCode::Char(c) => {
                if let Some(field) = self.focused_field() {
                    field.insert_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_field() {
                    field.delete_char();
                }
            }
            KeyCode::Delete => {
                if let Some(field) = self.focused_field() {
                    field.delete_char_forward();
                }
            }
            KeyCode::Left => {
                if let Some(field) = self.focused_field() {
                    field.move_cursor_left();
                }
            }
            KeyCode::Right => {
                if let Some(field) = self.focused_field() {
                    field.move_cursor_right();
                }
            }
            KeyCode::Home => {
                if let Some(field) = self.focused_field() {
                    field.move_cursor_to_start();
                }
            }
            KeyCode::End => {
                if let Some(field) = self.focused_field() {
                    field.move_cursor_to_end();
                }
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    async fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<ScreenAction> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(ScreenAction::None);
        }
        let (column, row) = (mouse.column, mouse.row);
        if self.login_button.hit(column, row) {
            self.set_focus(Focus::Button);
            return Ok(self.submit().await);
        }
        if ui::contains(self.code1.area(), column, row) {
            self.set_focus(Focus::Code1);
        } else if ui::contains(self.code2.area(), column, row) {
            self.set_focus(Focus::Code2);
        }
        Ok(ScreenAction::None)
    }

    fn captures_text_input(&self) -> bool {
        self.editing && self.focus != Focus::Button
    }

    fn key_hints(&self) -> &'static str {
        "Tab: next field | Enter: login | Esc: release input"
    }
}
