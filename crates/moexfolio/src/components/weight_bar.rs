//! Horizontal bars for portfolio weights.

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

use crate::util::format::format_percentage;

/// Block characters for sub-cell precision (from empty to full)
const BAR_CHARS: [&str; 9] = [" ", "▏", "▎", "▍", "▌", "▋", "▊", "▉", "█"];

/// Width of the ticker label column
const LABEL_WIDTH: usize = 6;
/// Width of the percentage column
const VALUE_WIDTH: usize = 8;

/// A bar `width` cells wide filled in proportion to `fraction` (clamped to [0, 1]).
pub fn bar(fraction: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let eighths = (fraction * (width * 8) as f64).round() as usize;
    let full = eighths / 8;
    let partial = eighths % 8;

    let mut out = BAR_CHARS[8].repeat(full);
    if full < width {
        out.push_str(BAR_CHARS[partial]);
        out.push_str(&" ".repeat(width - full - 1));
    }
    out
}

/// `TICKER ████▌     12.34%` sized to fit `total_width` columns.
pub fn weight_line(label: &str, weight: f64, total_width: usize, color: Color) -> Line<'static> {
    let bar_width = total_width.saturating_sub(LABEL_WIDTH + VALUE_WIDTH + 2);

    Line::from(vec![
        Span::styled(
            format!("{:<width$} ", label, width = LABEL_WIDTH),
            Style::default().fg(Color::White),
        ),
        Span::styled(bar(weight, bar_width), Style::default().fg(color)),
        Span::raw(format!(
            " {:>width$}",
            format_percentage(weight),
            width = VALUE_WIDTH
        )),
    ])
}
