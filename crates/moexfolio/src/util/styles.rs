//! Common styling utilities for TUI components

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};

/// Standard color for focused panels
pub const FOCUS_COLOR: Color = Color::Yellow;

/// Standard color for help text
pub const HELP_COLOR: Color = Color::DarkGray;

/// Standard color for headers
pub const HEADER_COLOR: Color = Color::Cyan;

/// Crosshair and selection marker
pub const CURSOR_COLOR: Color = Color::Yellow;

/// Sharpe terciles, worst to best
pub const SHARPE_COLORS: [Color; 3] = [Color::Red, Color::Blue, Color::Green];

/// Create a block with a title that shows focused state via border color.
pub fn focused_block(title: &str, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(FOCUS_COLOR)
    } else {
        Style::default()
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.to_string())
}

const LOW: (f64, f64, f64) = (215.0, 48.0, 39.0);
const MID: (f64, f64, f64) = (255.0, 255.0, 191.0);
const HIGH: (f64, f64, f64) = (26.0, 152.0, 80.0);

/// Diverging red-yellow-green scale: 0 is red, 0.5 yellow, 1 green.
///
/// Values are clamped to [0, 1]; undefined values are gray.
pub fn heat_color(value: f64) -> Color {
    if !value.is_finite() {
        return Color::DarkGray;
    }
    let t = value.clamp(0.0, 1.0);
    let (from, to, local) = if t < 0.5 {
        (LOW, MID, t * 2.0)
    } else {
        (MID, HIGH, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * local).round() as u8;

    Color::Rgb(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Text color that stays readable on top of `heat_color(value)`
pub fn heat_text_color(value: f64) -> Color {
    if value.is_finite() && (0.25..0.75).contains(&value) {
        Color::Black
    } else {
        Color::White
    }
}
