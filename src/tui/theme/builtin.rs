//! Built-in themes.

use ratatui::style::Color;

use super::Theme;

/// Neutral palette on the terminal's own background.
pub fn default() -> Theme {
    Theme {
        name: "Default".to_string(),

        status_fg: Color::White,
        status_bg: Color::DarkGray,
        status_accent: Color::Cyan,

        led_off: Color::DarkGray,
        led_listen: Color::Yellow,
        led_input: Color::Green,

        staff_note: Color::White,
        staff_hold: Color::Gray,
        staff_empty: Color::DarkGray,
        staff_matched: Color::Green,

        perfect: Color::Green,
        good: Color::Cyan,
        fault: Color::Red,

        lives: Color::LightRed,
        border: Color::White,
        title: Color::Cyan,
    }
}

/// Warm palette for dark terminals.
pub fn ember() -> Theme {
    Theme {
        name: "Ember".to_string(),

        status_fg: Color::Rgb(0xfb, 0xf1, 0xc7),
        status_bg: Color::Rgb(0x3c, 0x38, 0x36),
        status_accent: Color::Rgb(0xfe, 0x80, 0x19),

        led_off: Color::Rgb(0x50, 0x49, 0x45),
        led_listen: Color::Rgb(0xfa, 0xbd, 0x2f),
        led_input: Color::Rgb(0xb8, 0xbb, 0x26),

        staff_note: Color::Rgb(0xeb, 0xdb, 0xb2),
        staff_hold: Color::Rgb(0xa8, 0x99, 0x84),
        staff_empty: Color::Rgb(0x66, 0x5c, 0x54),
        staff_matched: Color::Rgb(0xb8, 0xbb, 0x26),

        perfect: Color::Rgb(0xb8, 0xbb, 0x26),
        good: Color::Rgb(0x83, 0xa5, 0x98),
        fault: Color::Rgb(0xfb, 0x49, 0x34),

        lives: Color::Rgb(0xfb, 0x49, 0x34),
        border: Color::Rgb(0xa8, 0x99, 0x84),
        title: Color::Rgb(0xfe, 0x80, 0x19),
    }
}

/// No colors beyond the terminal's own.
pub fn mono() -> Theme {
    Theme {
        name: "Mono".to_string(),

        status_fg: Color::Reset,
        status_bg: Color::Reset,
        status_accent: Color::White,

        led_off: Color::DarkGray,
        led_listen: Color::Gray,
        led_input: Color::White,

        staff_note: Color::White,
        staff_hold: Color::Gray,
        staff_empty: Color::DarkGray,
        staff_matched: Color::White,

        perfect: Color::White,
        good: Color::Gray,
        fault: Color::White,

        lives: Color::White,
        border: Color::Gray,
        title: Color::White,
    }
}

/// Every built-in, in cycling order.
pub fn all_builtins() -> Vec<Theme> {
    vec![default(), ember(), mono()]
}
