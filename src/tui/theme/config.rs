//! Custom theme from ~/.beat-the-beat/theme.yaml.
//!
//! The file is a flat map of `Theme` field names to colors, laid over the
//! default theme:
//!
//! ```yaml
//! name: Stage
//! led_input: "#00ff00"
//! fault: magenta
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use log::warn;
use ratatui::style::Color;

use super::{builtin, Theme};

/// Load the custom theme, if there is one and it parses.
pub fn load_theme_from_yaml() -> Option<Theme> {
    let path = dirs::home_dir()?.join(".beat-the-beat").join("theme.yaml");
    let content = std::fs::read_to_string(&path).ok()?;
    let theme = parse_theme_yaml(&content);
    if theme.is_none() {
        warn!("ignoring unreadable theme at {}", path.display());
    }
    theme
}

fn parse_theme_yaml(yaml: &str) -> Option<Theme> {
    let entries: BTreeMap<String, String> = serde_yaml::from_str(yaml).ok()?;
    let mut theme = builtin::default();
    theme.name = "Custom".to_string();

    for (key, value) in entries {
        if key == "name" {
            theme.name = value;
            continue;
        }
        // names ("cyan", "darkgray") or "#RRGGBB"
        let Ok(color) = Color::from_str(value.trim()) else {
            warn!("theme: '{key}' has unparsable color '{value}'");
            continue;
        };
        if !theme.set_color(&key, color) {
            warn!("theme: unknown key '{key}'");
        }
    }
    Some(theme)
}
