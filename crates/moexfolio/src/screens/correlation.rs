use crossterm::event::{KeyCode, KeyEvent};
use jiff::civil::Date;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use moexfolio_core::CorrelationMatrix;

use crate::components::{Component, EventResult};
use crate::pipeline::CorrelationAnalysis;
use crate::util::format::format_correlation;
use crate::util::styles::{HEADER_COLOR, HELP_COLOR, focused_block, heat_color, heat_text_color};

/// Columns per heatmap cell
const CELL_WIDTH: usize = 7;
/// Columns for the row labels
const LABEL_WIDTH: usize = 7;

/// Heatmap rows: a header of tickers, then one colored row per ticker.
pub fn heatmap_lines(matrix: &CorrelationMatrix) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(matrix.len() + 1);

    let mut header = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for ticker in matrix.tickers() {
        header.push(Span::styled(
            format!("{:^width$}", truncate(ticker), width = CELL_WIDTH),
            Style::default().fg(HEADER_COLOR),
        ));
    }
    lines.push(Line::from(header));

    for (i, ticker) in matrix.tickers().iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<width$}", truncate(ticker), width = LABEL_WIDTH),
            Style::default().fg(HEADER_COLOR),
        )];
        for j in 0..matrix.len() {
            let value = matrix.get(i, j);
            let text = if value.is_finite() {
                format!("{:.2}", value)
            } else {
                "n/a".to_string()
            };
            spans.push(Span::styled(
                format!("{:^width$}", text, width = CELL_WIDTH),
                Style::default()
                    .bg(heat_color(value))
                    .fg(heat_text_color(value)),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines
}

fn truncate(ticker: &str) -> String {
    ticker.chars().take(CELL_WIDTH - 1).collect()
}

pub struct CorrelationScreen {
    analysis: CorrelationAnalysis,
    start_date: Date,
    end_date: Date,
    scroll: usize,
}

impl CorrelationScreen {
    pub fn new(analysis: CorrelationAnalysis, start_date: Date, end_date: Date) -> Self {
        Self {
            analysis,
            start_date,
            end_date,
            scroll: 0,
        }
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn render_heatmap(&self, frame: &mut Frame, area: Rect) {
        let block = focused_block(" Return correlation ", true);
        let mut lines = heatmap_lines(&self.analysis.matrix);

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Legend: ", Style::default().fg(HELP_COLOR)),
            Span::styled("  0  ", Style::default().bg(heat_color(0.0))),
            Span::styled(" 0.5 ", Style::default().bg(heat_color(0.5)).fg(Color::Black)),
            Span::styled("  1  ", Style::default().bg(heat_color(1.0))),
        ]));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_pairs(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " Pairs with |corr| < {} ({}) ",
            self.analysis.threshold,
            self.analysis.pairs.len()
        );
        let block = focused_block(&title, false);

        let lines: Vec<Line> = if self.analysis.pairs.is_empty() {
            vec![Line::from(Span::styled(
                "  No low-correlation pairs found.",
                Style::default().fg(HELP_COLOR),
            ))]
        } else {
            self.analysis
                .pairs
                .iter()
                .map(|pair| {
                    Line::from(vec![
                        Span::raw(format!("  {:<6} + {:<6}", pair.first, pair.second)),
                        Span::styled(
                            format!("{:>9}", format_correlation(pair.correlation)),
                            Style::default().fg(Color::Green),
                        ),
                    ])
                })
                .collect()
        };

        let scroll = u16::try_from(self.scroll).unwrap_or(u16::MAX);
        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((scroll, 0)),
            area,
        );
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let block = focused_block(" Tickers to buy ", false);
        let tickers = if self.analysis.unique_tickers.is_empty() {
            "none".to_string()
        } else {
            self.analysis.unique_tickers.join(", ")
        };

        let lines = vec![
            Line::from(Span::styled(
                tickers,
                Style::default()
                    .fg(HEADER_COLOR)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Period: {} to {}", self.start_date, self.end_date),
                Style::default().fg(HELP_COLOR),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

impl Component for CorrelationScreen {
    fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        let last = self.analysis.pairs.len().saturating_sub(1);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.scroll = (self.scroll + 1).min(last),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = last,
            _ => return EventResult::NotHandled,
        }
        EventResult::Handled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Header row, one row per ticker, blank line, legend, borders
        let heatmap_height = u16::try_from(self.analysis.matrix.len() + 5).unwrap_or(u16::MAX);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(heatmap_height), Constraint::Min(3)])
            .split(area);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        self.render_heatmap(frame, rows[0]);
        self.render_pairs(frame, bottom[0]);
        self.render_summary(frame, bottom[1]);
    }

    fn help_text(&self) -> &'static str {
        "j/k: scroll pairs | g/G: top/bottom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use moexfolio_core::{LowCorrelationPair, PriceSeries, correlation_matrix};

    fn matrix() -> CorrelationMatrix {
        let days = [date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)];
        let series = |ticker: &str, prices: [f64; 4]| {
            PriceSeries::new(ticker, days.iter().copied().zip(prices))
        };
        correlation_matrix(&[
            series("GAZP", [100.0, 101.0, 99.0, 102.0]),
            series("SNGSP", [50.0, 50.5, 49.5, 51.0]),
        ])
        .unwrap()
    }

    fn screen(pairs: usize) -> CorrelationScreen {
        let matrix = matrix();
        let pairs = (0..pairs)
            .map(|i| LowCorrelationPair {
                first: format!("A{i}"),
                second: format!("B{i}"),
                correlation: 0.01,
            })
            .collect();
        let analysis = CorrelationAnalysis {
            matrix,
            pairs,
            unique_tickers: Vec::new(),
            threshold: 0.1,
        };
        CorrelationScreen::new(analysis, date(2015, 1, 1), date(2025, 3, 5))
    }

    #[test]
    fn test_heatmap_has_header_and_row_per_ticker() {
        let lines = heatmap_lines(&matrix());

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].width(), LABEL_WIDTH + 2 * CELL_WIDTH);
        assert!(lines[1].to_string().starts_with("GAZP"));
        assert!(lines[1].to_string().contains("1.00"));
        assert!(lines[2].to_string().starts_with("SNGSP"));
    }

    #[test]
    fn test_scroll_stays_in_range() {
        let mut screen = screen(3);

        screen.handle_key(KeyEvent::from(KeyCode::Up));
        assert_eq!(screen.scroll(), 0);

        for _ in 0..10 {
            screen.handle_key(KeyEvent::from(KeyCode::Char('j')));
        }
        assert_eq!(screen.scroll(), 2);

        screen.handle_key(KeyEvent::from(KeyCode::Char('g')));
        assert_eq!(screen.scroll(), 0);
        screen.handle_key(KeyEvent::from(KeyCode::Char('G')));
        assert_eq!(screen.scroll(), 2);
    }

    #[test]
    fn test_scroll_with_no_pairs() {
        let mut screen = screen(0);
        assert_eq!(
            screen.handle_key(KeyEvent::from(KeyCode::Down)),
            EventResult::Handled
        );
        assert_eq!(screen.scroll(), 0);
        assert_eq!(
            screen.handle_key(KeyEvent::from(KeyCode::Char('x'))),
            EventResult::NotHandled
        );
    }
}
