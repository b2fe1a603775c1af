//! Application state and key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use ratatui::widgets::TableState;
use tracing::info;

use super::rows::DisplayRow;

/// Tab titles, in display order.
pub const TABS: [&str; 2] = ["SubSleuth", "Subscriptions"];

pub const INFO_TAB: usize = 0;
pub const SUBSCRIPTIONS_TAB: usize = 1;

/// Static text of the info tab.
pub const INFO_TEXT: &str = "Hello!\n\n\
This program displays a table of Twitch EventSubs.\n\
You can add a new one with 'a' or select one to delete and press 'd'.";

/// What a key press asked for, beyond plain state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    /// `a` on the subscriptions tab. Not yet implemented.
    Add,
    /// `d` on the subscriptions tab. Not yet implemented.
    Delete(String),
    /// `Enter` on the subscriptions tab.
    Select(String),
}

/// TUI application state.
#[derive(Debug)]
pub struct App {
    pub active_tab: usize,
    pub rows: Vec<DisplayRow>,
    pub table_state: TableState,
    /// Most table rows shown at once, also the PageUp/PageDown step
    /// (the `--entries` flag).
    pub entries: usize,
    pub status: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(rows: Vec<DisplayRow>, entries: usize) -> Self {
        let selected = if rows.is_empty() { None } else { Some(0) };
        Self {
            active_tab: INFO_TAB,
            rows,
            table_state: TableState::default().with_selected(selected),
            entries: entries.max(1),
            status: String::new(),
            should_quit: false,
        }
    }

    pub const fn next_tab(&mut self) {
        self.active_tab = (self.active_tab + 1) % TABS.len();
    }

    pub const fn previous_tab(&mut self) {
        self.active_tab = (self.active_tab + TABS.len() - 1) % TABS.len();
    }

    pub fn selected_row(&self) -> Option<&DisplayRow> {
        self.table_state.selected().and_then(|i| self.rows.get(i))
    }

    /// Move the table selection by `delta` rows, clamped to the table.
    pub fn move_selection(&mut self, delta: isize) {
        let Some(last) = self.rows.len().checked_sub(1) else {
            self.table_state.select(None);
            return;
        };
        let current = self.table_state.selected().unwrap_or(0);
        let target = current.saturating_add_signed(delta).min(last);
        self.table_state.select(Some(target));
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.rows.len().checked_sub(1) {
            self.table_state.select(Some(last));
        }
    }

    fn page(&self) -> isize {
        isize::try_from(self.entries).unwrap_or(isize::MAX)
    }

    /// Apply a key press and report any follow-up action.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return self.quit(),
            KeyCode::Char('q') => return self.quit(),
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l' | 'n') => {
                self.next_tab();
                return KeyAction::None;
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h' | 'p') => {
                self.previous_tab();
                return KeyAction::None;
            }
            _ => {}
        }

        if self.active_tab != SUBSCRIPTIONS_TAB {
            return KeyAction::None;
        }

        match key.code {
            KeyCode::Char('u') if ctrl => {
                self.move_selection(-(self.page() / 2).max(1));
                KeyAction::None
            }
            KeyCode::Char('d' | 'f') if ctrl => {
                self.move_selection((self.page() / 2).max(1));
                KeyAction::None
            }
            KeyCode::Char('a') => {
                self.acknowledge("Adding subscriptions is not implemented yet");
                KeyAction::Add
            }
            KeyCode::Char('d') => {
                let name = self.selected_name();
                self.acknowledge(&format!(
                    "Deleting the webhook for {name} is not implemented yet"
                ));
                KeyAction::Delete(name)
            }
            KeyCode::Enter => {
                let name = self.selected_name();
                self.acknowledge(&format!("You selected the webhook for {name}"));
                KeyAction::Select(name)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                KeyAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                KeyAction::None
            }
            KeyCode::PageUp | KeyCode::Char('b') => {
                self.move_selection(-self.page());
                KeyAction::None
            }
            KeyCode::PageDown | KeyCode::Char('f' | ' ') => {
                self.move_selection(self.page());
                KeyAction::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.select_first();
                KeyAction::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.select_last();
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    /// Mouse wheel scrolls the table on the subscriptions tab.
    pub fn handle_mouse(&mut self, kind: MouseEventKind) {
        if self.active_tab != SUBSCRIPTIONS_TAB {
            return;
        }
        match kind {
            MouseEventKind::ScrollUp => self.move_selection(-1),
            MouseEventKind::ScrollDown => self.move_selection(1),
            _ => {}
        }
    }

    const fn quit(&mut self) -> KeyAction {
        self.should_quit = true;
        KeyAction::Quit
    }

    fn selected_name(&self) -> String {
        self.selected_row()
            .map(|r| r.name.clone())
            .unwrap_or_default()
    }

    fn acknowledge(&mut self, message: &str) {
        info!("{message}");
        self.status = message.to_string();
    }
}
