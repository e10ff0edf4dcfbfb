//! Application state and input handling for the handshake walkthrough

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::collections::VecDeque;
use tlsdh_core::{Handshake, Transition};
use tracing::debug;

use crate::theme::Theme;
use crate::ui;

/// Maximum entries kept in the activity log
const MAX_LOG_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "•",
            Self::Success => "✔",
            Self::Warning => "!",
            Self::Error => "✘",
        }
    }
}

/// One line in the activity log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

/// On-screen buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Previous,
    Primary,
}

pub struct App {
    pub handshake: Handshake,
    pub theme: Theme,
    pub log: VecDeque<LogEntry>,
    pub show_help: bool,
    pub terminal_width: u16,
    pub terminal_height: u16,
}

impl App {
    pub fn new(handshake: Handshake, theme: Theme) -> Self {
        let mut app = Self {
            handshake,
            theme,
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            show_help: false,
            terminal_width: 80,
            terminal_height: 24,
        };
        let server_public = app.handshake.server().public.to_string();
        app.push_log(
            LogLevel::Info,
            format!("Session started. Server certificate carries B = {}", server_public),
        );
        app
    }

    pub fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.push_front(LogEntry {
            timestamp: Local::now(),
            level,
            message: message.into(),
        });
        while self.log.len() > MAX_LOG_ENTRIES {
            self.log.pop_back();
        }
    }

    pub fn previous(&mut self) {
        let transition = self.handshake.previous();
        self.record(transition);
    }

    pub fn primary(&mut self) {
        let transition = self.handshake.primary();
        self.record(transition);
    }

    pub fn restart(&mut self) {
        self.handshake.restart();
        let server_public = self.handshake.server().public.to_string();
        self.push_log(
            LogLevel::Info,
            format!("Restarted. New server certificate carries B = {}", server_public),
        );
    }

    fn record(&mut self, transition: Transition) {
        match transition {
            Transition::Moved { from, to } => {
                self.push_log(LogLevel::Info, format!("{} -> {}", from.title(), to.title()));
            }
            Transition::KeysGenerated { public, .. } => {
                self.push_log(
                    LogLevel::Info,
                    format!("Client generated ephemeral keys and sent A = {}", public),
                );
            }
            Transition::SecretComputed(shared) => {
                if shared.matches() {
                    self.push_log(
                        LogLevel::Success,
                        format!("Both sides computed pre-master secret S = {}", shared.client),
                    );
                } else {
                    self.push_log(
                        LogLevel::Error,
                        format!("Mismatch: client S = {}, server S = {}", shared.client, shared.server),
                    );
                }
            }
            Transition::Ignored { reason, .. } => {
                self.push_log(LogLevel::Warning, format!("Nothing to do: {}", reason));
            }
        }
    }

    /// Handle keyboard input, returns true if should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            KeyCode::F(1) | KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                return false;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            _ => {}
        }

        // Help overlay consumes all other keys when shown
        if self.show_help {
            self.show_help = false;
            return false;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => self.previous(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => self.primary(),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('t') => {
                self.theme = self.theme.next();
                debug!(theme = self.theme.name(), "Theme changed");
            }
            KeyCode::Char('q') | KeyCode::Esc => return true,
            _ => {}
        }

        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if self.show_help {
                self.show_help = false;
                return;
            }
            match self.button_at(mouse.column, mouse.row) {
                Some(Button::Previous) => self.previous(),
                Some(Button::Primary) => self.primary(),
                None => {}
            }
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.terminal_height = height;
    }

    /// Which button, if any, is drawn at this cell.
    pub fn button_at(&self, column: u16, row: u16) -> Option<Button> {
        let area = Rect::new(0, 0, self.terminal_width, self.terminal_height);
        let areas = ui::Areas::new(area, self.handshake.results_visible());
        let (previous, primary) = ui::button_areas(areas.controls);
        let position = Position::new(column, row);
        if previous.contains(position) {
            Some(Button::Previous)
        } else if primary.contains(position) {
            Some(Button::Primary)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tlsdh_core::{BigUint, DomainParams, SecretRange, Step};

    fn app() -> App {
        let hs = Handshake::with_server_secret(
            DomainParams::toy(),
            SecretRange::default(),
            BigUint::from(6u32),
            StdRng::seed_from_u64(4),
        )
        .unwrap();
        App::new(hs, Theme::Dark)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_keys_drive_handshake() {
        let mut app = app();
        for _ in 0..4 {
            assert!(!app.handle_key(press(KeyCode::Enter)));
        }
        assert_eq!(app.handshake.step(), Step::Finished);
        assert_eq!(app.handshake.secrets_match(), Some(true));
        assert_eq!(app.log.front().map(|e| e.level), Some(LogLevel::Success));

        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.handshake.step(), Step::PreMasterSecret);
    }

    #[test]
    fn test_previous_at_start_logs_warning() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('h')));
        assert_eq!(app.handshake.step(), Step::ClientHello);
        assert_eq!(app.log.front().map(|e| e.level), Some(LogLevel::Warning));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut app = app();
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        app.handle_key(release);
        assert_eq!(app.handshake.step(), Step::ClientHello);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(app.handle_key(press(KeyCode::Char('q'))));
        assert!(app.handle_key(press(KeyCode::Esc)));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        app.handle_key(press(KeyCode::F(1)));
        assert!(app.show_help);
        assert!(!app.handle_key(press(KeyCode::Char('q'))));
        assert!(!app.show_help);
        assert_eq!(app.handshake.step(), Step::ClientHello);
    }

    #[test]
    fn test_restart_and_theme() {
        let mut app = app();
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Char('r')));
        assert_eq!(app.handshake.step(), Step::ClientHello);

        app.handle_key(press(KeyCode::Char('t')));
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut app = app();
        for i in 0..(MAX_LOG_ENTRIES * 2) {
            app.push_log(LogLevel::Info, format!("entry {}", i));
        }
        assert_eq!(app.log.len(), MAX_LOG_ENTRIES);
        assert_eq!(app.log.front().map(|e| e.message.as_str()), Some("entry 99"));
    }

    #[test]
    fn test_mouse_clicks_buttons() {
        let mut app = app();
        app.handle_resize(100, 40);

        let areas = ui::Areas::new(Rect::new(0, 0, 100, 40), false);
        let (previous, primary) = ui::button_areas(areas.controls);

        app.handle_mouse(click(primary.x + 1, primary.y + 1));
        assert_eq!(app.handshake.step(), Step::Certificate);

        app.handle_mouse(click(previous.x + 1, previous.y + 1));
        assert_eq!(app.handshake.step(), Step::ClientHello);

        app.handle_mouse(click(0, 0));
        assert_eq!(app.handshake.step(), Step::ClientHello);
        assert_eq!(app.button_at(0, 0), None);
    }
}
