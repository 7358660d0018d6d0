use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::components::{Component, EventResult, status_bar::StatusBar};
use crate::screens::{CorrelationScreen, ExplorerScreen};

/// The screen an analysis run opens on
pub enum Screen {
    Explorer(ExplorerScreen),
    Correlation(CorrelationScreen),
}

pub struct App {
    screen: Screen,
    status_bar: StatusBar,
    exit: bool,
}

impl App {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            status_bar: StatusBar::new(),
            exit: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    /// runs the application's main loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn active(&mut self) -> &mut dyn Component {
        match &mut self.screen {
            Screen::Explorer(screen) => screen,
            Screen::Correlation(screen) => screen,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Content
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        let screen = self.active();
        screen.render(frame, chunks[0]);
        let help = screen.help_text();
        let message = screen.status_message().map(str::to_owned);

        self.status_bar
            .render(frame, chunks[1], help, message.as_deref());
    }

    fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') if key_event.modifiers.is_empty() => {
                self.exit = true;
                return;
            }
            KeyCode::Esc => {
                self.exit = true;
                return;
            }
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.exit = true;
                return;
            }
            _ => {}
        }

        if self.active().handle_key(key_event) == EventResult::Exit {
            self.exit = true;
        }
    }

    pub fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        if self.active().handle_mouse(mouse_event) == EventResult::Exit {
            self.exit = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moexfolio_core::{Explorer, PortfolioSample, SampleBuffer};

    fn app() -> App {
        let buffer = SampleBuffer::new(
            vec!["SBER".to_string(), "GAZP".to_string()],
            vec![PortfolioSample {
                expected_return: 0.1,
                risk: 0.2,
                sharpe: 0.5,
                weights: vec![0.5, 0.5],
            }],
        )
        .unwrap();
        App::new(Screen::Explorer(ExplorerScreen::new(Explorer::new(buffer))))
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            KeyEvent::from(KeyCode::Char('q')),
            KeyEvent::from(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app();
            app.handle_key_event(key);
            assert!(app.should_exit());
        }
    }

    #[test]
    fn test_screen_keys_do_not_quit() {
        let mut app = app();
        app.handle_key_event(KeyEvent::from(KeyCode::Char('m')));
        app.handle_key_event(KeyEvent::from(KeyCode::Char('c')));
        assert!(!app.should_exit());
    }
}
