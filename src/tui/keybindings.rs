//! Key bindings — maps key events to game actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Game-level actions triggered by key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Start a session (or restart after game over).
    Start,
    /// Strike the beat.
    Hit,
    /// Stop the running session without quitting.
    Stop,
    /// Cycle to the next theme.
    CycleTheme,
    /// Toggle the help overlay.
    ToggleHelp,
}

/// Map a key event to an action.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Hit),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Start),
        KeyCode::Char('x') => Some(Action::Stop),
        KeyCode::Char('t') => Some(Action::CycleTheme),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Key reference shown in the help overlay.
pub const HELP: &[(&str, &str)] = &[
    ("Space / Enter", "hit"),
    ("s", "start / restart"),
    ("x", "stop"),
    ("t", "cycle theme"),
    ("?", "toggle help"),
    ("q / Esc", "quit"),
];
