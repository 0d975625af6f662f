//! Main TUI application state and logic

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::components::NavBar;
use super::screens::*;
use super::traits::{Screen, ScreenAction};
use super::ui::Theme;
use crate::config::Config;
use crate::itkdb::{record_str, Authenticator, DatabaseClient, ItkdbApi, ItkdbError, Record};

/// Every screen the browser knows, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Login,
    Main,
    ListInstitutions,
    ReorderStages,
}

impl ScreenId {
    pub const ALL: [ScreenId; 4] = [
        ScreenId::Login,
        ScreenId::Main,
        ScreenId::ListInstitutions,
        ScreenId::ReorderStages,
    ];

    /// Navigation name; screens without one never show up in the nav bar
    pub fn name(self) -> Option<&'static str> {
        match self {
            ScreenId::Login => None,
            ScreenId::Main => Some("main"),
            ScreenId::ListInstitutions => Some("list_institutions"),
            ScreenId::ReorderStages => Some("reorder_stages"),
        }
    }
}

/// Screens that only exist once a session is established
struct SessionScreens {
    client: Arc<dyn DatabaseClient>,
    main: MainScreen,
    institutions: InstitutionScreen,
    stages: StageReorderScreen,
}

/// Main TUI application state
pub struct App {
    /// Screen stack; the top is the active screen
    pub stack: Vec<ScreenId>,
    pub theme: Theme,
    pub should_quit: bool,
    /// Bells requested since the last frame
    pub pending_bells: usize,
    login: LoginScreen,
    session: Option<SessionScreens>,
    nav: NavBar,
}

impl App {
    pub fn new(config: &Config, authenticator: Arc<dyn Authenticator>) -> Self {
        let login = LoginScreen::new(
            authenticator,
            config.access_code1.as_deref(),
            config.access_code2.as_deref(),
        );
        Self {
            stack: vec![ScreenId::Login],
            theme: Theme::default(),
            should_quit: false,
            pending_bells: 0,
            login,
            session: None,
            nav: NavBar::build(&[], ScreenId::Login),
        }
    }

    pub fn current(&self) -> ScreenId {
        self.stack.last().copied().unwrap_or(ScreenId::Login)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Run the main application loop
    pub async fn run<B: Backend + Write>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            match crossterm::event::read()? {
                Event::Key(key) => self.handle_key_event(key).await?,
                Event::Mouse(mouse) => self.handle_mouse_event(mouse).await?,
                _ => {}
            }

            if self.pending_bells > 0 {
                self.pending_bells = 0;
                let backend = terminal.backend_mut();
                backend.write_all(b"\x07")?;
                Write::flush(backend)?;
            }

            if self.should_quit {
                info!("Quit requested");
                break;
            }
        }
        Ok(())
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.apply(ScreenAction::Quit).await;
        }

        if !self.captures_text_input() {
            match key.code {
                KeyCode::Char('q') => return self.apply(ScreenAction::Quit).await,
                KeyCode::Char('d') => {
                    self.theme = self.theme.toggled();
                    debug!("Theme switched to {}", self.theme.name());
                    return Ok(());
                }
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    return match self.nav.hotkey(c) {
                        Some(target) => self.apply(ScreenAction::SwitchTo(target)).await,
                        None => Ok(()),
                    };
                }
                _ => {}
            }
        }

        let action = match (self.current(), self.session.as_mut()) {
            (ScreenId::Login, _) => self.login.handle_key_event(key).await?,
            (ScreenId::Main, Some(s)) => s.main.handle_key_event(key).await?,
            (ScreenId::ListInstitutions, Some(s)) => s.institutions.handle_key_event(key).await?,
            (ScreenId::ReorderStages, Some(s)) => s.stages.handle_key_event(key).await?,
            _ => ScreenAction::None,
        };
        self.apply(action).await
    }

    /// Handle mouse input events
    pub async fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            if let Some(target) = self.nav.click(mouse.column, mouse.row) {
                return self.apply(ScreenAction::SwitchTo(target)).await;
            }
        }

        let action = match (self.current(), self.session.as_mut()) {
            (ScreenId::Login, _) => self.login.handle_mouse_event(mouse).await?,
            (ScreenId::Main, Some(s)) => s.main.handle_mouse_event(mouse).await?,
            (ScreenId::ListInstitutions, Some(s)) => {
                s.institutions.handle_mouse_event(mouse).await?
            }
            (ScreenId::ReorderStages, Some(s)) => s.stages.handle_mouse_event(mouse).await?,
            _ => ScreenAction::None,
        };
        self.apply(action).await
    }

    fn captures_text_input(&self) -> bool {
        match self.current() {
            ScreenId::Login => self.login.captures_text_input(),
            _ => false,
        }
    }

    async fn apply(&mut self, action: ScreenAction) -> Result<()> {
        match action {
            ScreenAction::SwitchTo(target) => self.switch_screen(target).await?,
            ScreenAction::LoggedIn => self.complete_login().await?,
            other => self.note(other),
        }
        Ok(())
    }

    /// Actions that need no navigation
    fn note(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::Bell => self.pending_bells += 1,
            _ => {}
        }
    }

    /// Replace the top of the stack with `target`
    pub async fn switch_screen(&mut self, target: ScreenId) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if target == ScreenId::Login {
            return Ok(());
        }
        debug!("Switching to {:?}", target);
        if let Some(top) = self.stack.last_mut() {
            *top = target;
        }

        let action = match target {
            ScreenId::Main => session.main.on_enter().await?,
            ScreenId::ListInstitutions => session.institutions.on_enter().await?,
            ScreenId::ReorderStages => session.stages.on_enter().await?,
            ScreenId::Login => ScreenAction::None,
        };
        self.nav = NavBar::build(&ScreenId::ALL, target);
        self.note(action);
        Ok(())
    }

    /// Fetch the user and projects, build the session screens and leave the login screen
    async fn complete_login(&mut self) -> Result<()> {
        let Some(client) = self.login.take_client() else {
            return Ok(());
        };
        match load_session(client).await {
            Ok(session) => {
                info!("Session ready for {}", session.client.session().identity);
                self.session = Some(session);
                self.stack.pop();
                self.stack.push(ScreenId::Main);
                self.nav = NavBar::build(&ScreenId::ALL, ScreenId::Main);
            }
            Err(e) => {
                warn!("Could not load the user after login: {}", e);
                self.login.fail(format!("Could not load the user: {}", e));
                self.pending_bells += 1;
            }
        }
        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();
        f.render_widget(Block::default().style(self.theme.base()), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(if self.is_logged_in() { 3 } else { 0 }),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        if self.is_logged_in() {
            self.nav.render(f, chunks[1], self.theme);
        }

        let theme = self.theme;
        match (self.current(), self.session.as_mut()) {
            (ScreenId::Login, _) => self.login.draw(f, chunks[2], theme),
            (ScreenId::Main, Some(s)) => s.main.draw(f, chunks[2], theme),
            (ScreenId::ListInstitutions, Some(s)) => s.institutions.draw(f, chunks[2], theme),
            (ScreenId::ReorderStages, Some(s)) => s.stages.draw(f, chunks[2], theme),
            _ => {}
        }

        self.draw_footer(f, chunks[3]);
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled("ITk Production Database Browser", self.theme.title())];
        if let Some(session) = &self.session {
            spans.push(Span::styled(
                format!("  {}", session.client.session().identity),
                self.theme.inactive(),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)).style(self.theme.base()), area);
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let hints = match (self.current(), self.session.as_ref()) {
            (ScreenId::Login, _) => self.login.key_hints(),
            (ScreenId::Main, Some(s)) => s.main.key_hints(),
            (ScreenId::ListInstitutions, Some(s)) => s.institutions.key_hints(),
            (ScreenId::ReorderStages, Some(s)) => s.stages.key_hints(),
            _ => "",
        };

        let mut text = String::from("q: quit | d: theme | Ctrl+C: exit");
        if self.is_logged_in() {
            text.push_str(" | 1-3: screens");
        }
        if !hints.is_empty() {
            text.push_str(" | ");
            text.push_str(hints);
        }

        let footer = Paragraph::new(text)
            .style(self.theme.inactive())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, area);
    }
}

async fn load_session(client: Arc<dyn DatabaseClient>) -> Result<SessionScreens, ItkdbError> {
    let identity = client.session().identity.clone();
    let user = client
        .get_one(ItkdbApi::GET_USER, json!({ "userIdentity": identity }))
        .await?;
    let projects = client.get(ItkdbApi::LIST_PROJECTS, json!({})).await?;

    let default_project = default_project(&user);
    debug!(
        "User has {} projects, default {}",
        projects.len(),
        default_project
    );

    Ok(SessionScreens {
        main: MainScreen::new(user, &identity),
        institutions: InstitutionScreen::new(client.clone()),
        stages: StageReorderScreen::new(client.clone(), &projects, &default_project),
        client,
    })
}

fn default_project(user: &Record) -> String {
    user.get("preferences")
        .and_then(Value::as_object)
        .and_then(|preferences| record_str(preferences, "defaultProject"))
        .unwrap_or_else(|| FALLBACK_PROJECT.to_string())
}
