//! Profile screen: who is logged in and which institutions they belong to

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use crate::browser_tui::{
    traits::{Screen, ScreenAction},
    ui::Theme,
};
use crate::itkdb::{is_truthy, record_str, Record};

const ROLES: [&str; 5] = [
    "default",
    "executive",
    "authority",
    "componentManager",
    "clusterManager",
];
const NOTIFICATIONS: [&str; 3] = ["shipping", "tests", "components"];

/// Flags of one institution membership
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionCard {
    pub code: String,
    pub name: String,
    pub roles: Vec<(&'static str, bool)>,
    pub notifications: Vec<(&'static str, bool)>,
}

impl InstitutionCard {
    pub fn from_record(institution: &Record) -> Self {
        let notification = institution.get("notification").and_then(Value::as_object);
        Self {
            code: record_str(institution, "code").unwrap_or_default(),
            name: record_str(institution, "name").unwrap_or_default(),
            roles: ROLES
                .iter()
                .map(|role| (*role, is_truthy(institution.get(*role))))
                .collect(),
            notifications: NOTIFICATIONS
                .iter()
                .map(|kind| (*kind, is_truthy(notification.and_then(|n| n.get(*kind)))))
                .collect(),
        }
    }

    fn lines(&self, theme: Theme) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(vec![
            Span::styled(self.name.clone(), theme.title()),
            Span::styled(format!(" ({})", self.code), theme.inactive()),
        ])];
        lines.push(Line::from(Span::styled("Roles:", theme.info())));
        for (role, on) in &self.roles {
            lines.push(flag_line(role, *on, theme));
        }
        lines.push(Line::from(Span::styled("Notification:", theme.info())));
        for (kind, on) in &self.notifications {
            lines.push(flag_line(kind, *on, theme));
        }
        lines
    }
}

fn flag_line(label: &str, on: bool, theme: Theme) -> Line<'static> {
    let (mark, style) = if on {
        ("✅", theme.success())
    } else {
        ("❌", theme.error())
    };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(mark, style),
        Span::raw(format!(" {}", label)),
    ])
}

pub struct MainScreen {
    user: Record,
    identity: String,
    cards: Vec<InstitutionCard>,
}

impl MainScreen {
    pub fn new(user: Record, identity: &str) -> Self {
        let cards = user
            .get("institutions")
            .and_then(Value::as_array)
            .map(|institutions| {
                institutions
                    .iter()
                    .filter_map(Value::as_object)
                    .map(InstitutionCard::from_record)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            user,
            identity: identity.to_string(),
            cards,
        }
    }

    pub fn cards(&self) -> &[InstitutionCard] {
        &self.cards
    }

    /// Name, email, identity and preferences as plain text lines
    pub fn profile_lines(&self) -> Vec<String> {
        let first = record_str(&self.user, "firstName").unwrap_or_default();
        let last = record_str(&self.user, "lastName").unwrap_or_default();
        let email = record_str(&self.user, "email").unwrap_or_default();

        let mut lines = vec![
            format!("{} {} ({})", first, last, email),
            format!("Identity: {}", self.identity),
        ];
        if let Some(preferences) = self
            .user
            .get("preferences")
            .and_then(Value::as_object)
            .filter(|p| !p.is_empty())
        {
            lines.push("Preferences:".to_string());
            for (key, value) in preferences {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("  {}: {}", key, value));
            }
        }
        lines
    }
}

impl Screen for MainScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let profile = self.profile_lines();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(profile.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(area);

        let lines: Vec<Line> = profile
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    Line::from(Span::styled(line, theme.title()))
                } else {
                    Line::from(line)
                }
            })
            .collect();
        let details = Paragraph::new(lines).block(
            Block::default()
                .title("User")
                .borders(Borders::ALL)
                .border_style(theme.active_border()),
        );
        f.render_widget(details, chunks[0]);

        if self.cards.is_empty() {
            let empty = Paragraph::new("No institutions").style(theme.inactive()).block(
                Block::default()
                    .title("Institutions")
                    .borders(Borders::ALL)
                    .border_style(theme.inactive_border()),
            );
            f.render_widget(empty, chunks[1]);
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                self.cards
                    .iter()
                    .map(|_| Constraint::Ratio(1, self.cards.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(chunks[1]);
        for (card, column) in self.cards.iter().zip(columns.iter()) {
            let paragraph = Paragraph::new(card.lines(theme))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title("Institution")
                        .borders(Borders::ALL)
                        .border_style(theme.inactive_border()),
                );
            f.render_widget(paragraph, *column);
        }
    }

    async fn handle_key_event(&mut self, _key: KeyEvent) -> Result<ScreenAction> {
        Ok(ScreenAction::None)
    }
}
