use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Paragraph,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};
use tracing::{debug, info};

use moexfolio_core::{Explorer, PortfolioComposition, SampleBuffer};

use crate::components::weight_bar::weight_line;
use crate::components::{Component, EventResult};
use crate::util::format::{format_percentage, format_sharpe};
use crate::util::styles::{CURSOR_COLOR, HEADER_COLOR, HELP_COLOR, SHARPE_COLORS, focused_block};

/// Arrow keys move the crosshair by this fraction of the visible range
const CURSOR_STEPS: f64 = 40.0;
/// Padding added around the sampled cloud, as a fraction of its extent
const BOUNDS_PADDING: f64 = 0.05;

/// Mapping between terminal cells of the plot area and risk/return space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub area: Rect,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Viewport {
    /// Data coordinates at the center of a terminal cell, or `None` outside the plot.
    ///
    /// Columns grow to the right with x; rows grow downward while y grows upward.
    pub fn to_data(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }

        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        Some((x0 + fx * (x1 - x0), y1 - fy * (y1 - y0)))
    }
}

/// `(lo, hi)` widened by `BOUNDS_PADDING`; a degenerate range gets a fixed margin
fn padded(bounds: Option<(f64, f64)>) -> [f64; 2] {
    let Some((lo, hi)) = bounds else {
        return [0.0, 1.0];
    };
    let pad = if hi > lo {
        (hi - lo) * BOUNDS_PADDING
    } else {
        0.01
    };
    [lo - pad, hi + pad]
}

/// Split sample points into Sharpe terciles (worst, middle, best).
///
/// Points with a non-finite risk or return are left out. `+inf` ranks best;
/// `-inf` and NaN rank worst.
pub fn sharpe_terciles(buffer: &SampleBuffer) -> [Vec<(f64, f64)>; 3] {
    let mut sorted: Vec<f64> = buffer
        .iter()
        .map(|s| s.sharpe)
        .filter(|s| s.is_finite())
        .collect();
    sorted.sort_by(f64::total_cmp);

    let cut = |num: usize| sorted.get(sorted.len() * num / 3).copied();
    let (low, high) = (cut(1), cut(2));

    let mut tiers: [Vec<(f64, f64)>; 3] = Default::default();
    for sample in buffer {
        if !(sample.risk.is_finite() && sample.expected_return.is_finite()) {
            continue;
        }
        let s = sample.sharpe;
        let tier = if s.is_nan() || s == f64::NEG_INFINITY {
            0
        } else if s == f64::INFINITY {
            2
        } else if low.is_some_and(|low| s < low) {
            0
        } else if high.is_some_and(|high| s < high) {
            1
        } else {
            2
        };
        tiers[tier].push((sample.risk, sample.expected_return));
    }
    tiers
}

pub struct ExplorerScreen {
    explorer: Explorer,
    tiers: [Vec<(f64, f64)>; 3],
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    /// Crosshair position as (risk, return)
    cursor: (f64, f64),
    selection: Option<PortfolioComposition>,
    viewport: Option<Viewport>,
    error: Option<String>,
}

impl ExplorerScreen {
    pub fn new(explorer: Explorer) -> Self {
        let buffer = explorer.buffer();
        let tiers = sharpe_terciles(buffer);
        let x_bounds = padded(buffer.risk_bounds());
        let y_bounds = padded(buffer.return_bounds());
        let start = buffer.max_sharpe().or_else(|| buffer.min_risk());

        let mut screen = Self {
            explorer,
            tiers,
            x_bounds,
            y_bounds,
            cursor: (
                (x_bounds[0] + x_bounds[1]) / 2.0,
                (y_bounds[0] + y_bounds[1]) / 2.0,
            ),
            selection: None,
            viewport: None,
            error: None,
        };
        if let Some(index) = start {
            screen.select_index(index);
        }
        screen
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    pub fn selection(&self) -> Option<&PortfolioComposition> {
        self.selection.as_ref()
    }

    /// Select the sample nearest to a point in risk/return space.
    pub fn select_at(&mut self, risk: f64, ret: f64) {
        match self.explorer.select_nearest(risk, ret) {
            Ok(composition) => {
                info!(
                    index = composition.selected_index,
                    risk = composition.selected_risk,
                    ret = composition.selected_return,
                    "Selected portfolio"
                );
                self.error = None;
                self.selection = Some(composition);
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Select a sample by index and move the crosshair onto it.
    fn select_index(&mut self, index: usize) {
        if let Some(composition) = self.explorer.composition(index) {
            self.cursor = (composition.selected_risk, composition.selected_return);
            self.error = None;
            self.selection = Some(composition);
        }
    }

    fn move_cursor(&mut self, dx: f64, dy: f64) {
        let step_x = (self.x_bounds[1] - self.x_bounds[0]) / CURSOR_STEPS;
        let step_y = (self.y_bounds[1] - self.y_bounds[0]) / CURSOR_STEPS;
        self.cursor = (
            (self.cursor.0 + dx * step_x).clamp(self.x_bounds[0], self.x_bounds[1]),
            (self.cursor.1 + dy * step_y).clamp(self.y_bounds[0], self.y_bounds[1]),
        );
    }

    fn render_plot(&mut self, frame: &mut Frame, area: Rect) {
        let block = focused_block(" Risk / Return ", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(8), Constraint::Min(1)])
            .split(rows[0]);
        let (label_area, plot) = (cols[0], cols[1]);

        self.viewport = Some(Viewport {
            area: plot,
            x_bounds: self.x_bounds,
            y_bounds: self.y_bounds,
        });

        let [y0, y1] = self.y_bounds;
        let mut y_labels = vec![Line::from(format_percentage(y1))];
        y_labels.extend((2..label_area.height).map(|_| Line::from("")));
        y_labels.push(Line::from(format_percentage(y0)));
        frame.render_widget(
            Paragraph::new(y_labels).style(Style::default().fg(HELP_COLOR)),
            label_area,
        );

        let [x0, x1] = self.x_bounds;
        let x_axis = Rect {
            x: plot.x,
            width: plot.width,
            ..rows[1]
        };
        frame.render_widget(
            Paragraph::new(format!("risk {}", format_percentage(x0))).fg(HELP_COLOR),
            x_axis,
        );
        frame.render_widget(
            Paragraph::new(format_percentage(x1))
                .fg(HELP_COLOR)
                .alignment(Alignment::Right),
            x_axis,
        );

        let tiers = &self.tiers;
        let (cx, cy) = self.cursor;
        let selected = self
            .selection
            .as_ref()
            .map(|s| (s.selected_risk, s.selected_return));

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(move |ctx| {
                for (points, color) in tiers.iter().zip(SHARPE_COLORS) {
                    ctx.draw(&Points {
                        coords: points,
                        color,
                    });
                }
                ctx.layer();
                ctx.draw(&CanvasLine::new(cx, y0, cx, y1, CURSOR_COLOR));
                ctx.draw(&CanvasLine::new(x0, cy, x1, cy, CURSOR_COLOR));
                if let Some((risk, ret)) = selected {
                    ctx.print(
                        risk,
                        ret,
                        Span::styled(
                            "◆",
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            });
        frame.render_widget(canvas, plot);
    }

    fn render_composition(&self, frame: &mut Frame, area: Rect) {
        let block = focused_block(" Composition ", false);
        let inner = block.inner(area);
        let width = inner.width as usize;
        let header = Style::default()
            .fg(HEADER_COLOR)
            .add_modifier(Modifier::BOLD);

        let mut lines: Vec<Line> = Vec::new();
        match &self.selection {
            Some(selection) => {
                lines.push(Line::from(Span::styled(
                    format!("Portfolio #{}", selection.selected_index),
                    header,
                )));
                lines.push(stat_line("Return", format_percentage(selection.selected_return)));
                lines.push(stat_line("Risk", format_percentage(selection.selected_risk)));
                lines.push(stat_line("Sharpe", format_sharpe(selection.selected_sharpe)));
                lines.push(Line::from(""));

                for (ticker, weight) in &selection.filtered_weights {
                    lines.push(weight_line(ticker, *weight, width, Color::Green));
                }
                let hidden = selection.hidden_weight();
                if hidden > 1e-9 {
                    lines.push(weight_line("other", hidden, width, Color::DarkGray));
                }
            }
            None => lines.push(Line::from("  Click the map or press Enter.")),
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Cursor  ", Style::default().fg(HELP_COLOR)),
            Span::raw(format!(
                "risk {}  return {}",
                format_percentage(self.cursor.0),
                format_percentage(self.cursor.1)
            )),
        ]));

        let mut legend = vec![Span::styled("Sharpe  ", Style::default().fg(HELP_COLOR))];
        for (label, color) in ["low ", "mid ", "high"].into_iter().zip(SHARPE_COLORS) {
            legend.push(Span::styled("■ ", Style::default().fg(color)));
            legend.push(Span::raw(label));
        }
        lines.push(Line::from(legend));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<8}", label), Style::default().fg(HELP_COLOR)),
        Span::raw(value),
    ])
}

impl Component for ExplorerScreen {
    fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1.0, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1.0, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0.0, 1.0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0.0, -1.0),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let (risk, ret) = self.cursor;
                self.select_at(risk, ret);
            }
            KeyCode::Char('m') => {
                if let Some(index) = self.explorer.buffer().max_sharpe() {
                    self.select_index(index);
                }
            }
            KeyCode::Char('n') => {
                if let Some(index) = self.explorer.buffer().min_risk() {
                    self.select_index(index);
                }
            }
            _ => return EventResult::NotHandled,
        }
        EventResult::Handled
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return EventResult::NotHandled;
        }
        let Some(point) = self
            .viewport
            .and_then(|v| v.to_data(mouse.column, mouse.row))
        else {
            return EventResult::NotHandled;
        };

        debug!(column = mouse.column, row = mouse.row, ?point, "Map click");
        self.cursor = point;
        self.select_at(point.0, point.1);
        EventResult::Handled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        self.render_plot(frame, chunks[0]);
        self.render_composition(frame, chunks[1]);
    }

    fn help_text(&self) -> &'static str {
        "arrows/hjkl: move | Enter/click: select nearest | m: max Sharpe | n: min risk"
    }

    fn status_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
