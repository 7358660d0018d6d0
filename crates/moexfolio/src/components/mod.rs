pub mod status_bar;
pub mod weight_bar;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

/// Result of handling an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Event was handled, continue
    Handled,
    /// Event was not handled, pass to parent
    NotHandled,
    /// Request app exit
    Exit,
}

/// Trait for components that can handle input and render
pub trait Component {
    /// Handle a key event
    fn handle_key(&mut self, key: KeyEvent) -> EventResult;

    /// Handle a mouse event; most components ignore the mouse
    fn handle_mouse(&mut self, _mouse: MouseEvent) -> EventResult {
        EventResult::NotHandled
    }

    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Key hints shown in the status bar
    fn help_text(&self) -> &'static str;

    /// Transient message (usually an error) shown instead of the key hints
    fn status_message(&self) -> Option<&str> {
        None
    }
}
