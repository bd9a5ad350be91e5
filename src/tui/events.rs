//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::state::Action;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// State transition produced by a background catalog fetch or dispatch
    Action(Action),
    /// Terminal resized; only forces a redraw
    Resize,
}
