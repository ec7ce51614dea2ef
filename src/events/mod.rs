//! Terminal events consumed by the application.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// An input event for [`crate::app::App::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Nothing happened within the tick interval.
    Tick,
}
