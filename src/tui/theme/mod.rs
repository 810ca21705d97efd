//! Theme system — configurable color schemes for the game screen.

pub mod builtin;
pub mod config;

use ratatui::style::Color;

/// A complete color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Status bar
    pub status_fg: Color,
    pub status_bg: Color,
    pub status_accent: Color,

    // Beat LEDs
    pub led_off: Color,
    pub led_listen: Color,
    pub led_input: Color,

    // Notation staff
    pub staff_note: Color,
    pub staff_hold: Color,
    pub staff_empty: Color,
    pub staff_matched: Color,

    // Judgments
    pub perfect: Color,
    pub good: Color,
    pub fault: Color,

    // Chrome
    pub lives: Color,
    pub border: Color,
    pub title: Color,
}

impl Theme {
    /// Set the color named by a theme.yaml key. Returns `false` for an unknown key.
    pub fn set_color(&mut self, key: &str, color: Color) -> bool {
        let slot = match key {
            "status_fg" => &mut self.status_fg,
            "status_bg" => &mut self.status_bg,
            "status_accent" => &mut self.status_accent,
            "led_off" => &mut self.led_off,
            "led_listen" => &mut self.led_listen,
            "led_input" => &mut self.led_input,
            "staff_note" => &mut self.staff_note,
            "staff_hold" => &mut self.staff_hold,
            "staff_empty" => &mut self.staff_empty,
            "staff_matched" => &mut self.staff_matched,
            "perfect" => &mut self.perfect,
            "good" => &mut self.good,
            "fault" => &mut self.fault,
            "lives" => &mut self.lives,
            "border" => &mut self.border,
            "title" => &mut self.title,
            _ => return false,
        };
        *slot = color;
        true
    }
}

/// The themes `t` cycles through, and which one is showing.
///
/// Never empty.
#[derive(Debug, Clone)]
pub struct ThemeSet {
    themes: Vec<Theme>,
    active: usize,
}

impl ThemeSet {
    /// An empty list falls back to the default theme.
    pub fn new(mut themes: Vec<Theme>) -> Self {
        if themes.is_empty() {
            themes.push(builtin::default());
        }
        Self { themes, active: 0 }
    }

    /// The built-ins, led by the user's theme.yaml if it parses.
    pub fn load() -> Self {
        let mut themes = builtin::all_builtins();
        if let Some(custom) = config::load_theme_from_yaml() {
            themes.insert(0, custom);
        }
        Self::new(themes)
    }

    /// The theme currently in use.
    pub fn active(&self) -> &Theme {
        &self.themes[self.active]
    }

    /// Switch to the following theme, wrapping after the last.
    pub fn cycle(&mut self) -> &Theme {
        self.active = (self.active + 1) % self.themes.len();
        self.active()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
