use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::util::styles::HELP_COLOR;

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, help: &str, message: Option<&str>) {
        let content = match message {
            Some(message) => Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red)),
                Span::raw(message.to_string()),
            ]),
            None => Line::from(Span::styled(
                format!("{help} | q: quit"),
                Style::default().fg(HELP_COLOR),
            )),
        };

        let paragraph = Paragraph::new(content).block(Block::default().borders(Borders::TOP));
        frame.render_widget(paragraph, area);
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
