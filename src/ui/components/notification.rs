//! Toast notifications for non-blocking feedback.
//!
//! Failures use the blocking alert dialog instead; toasts only confirm
//! that something worked ("Contact created", "Logged in").

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::theme::theme;

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Maximum number of toasts shown at once.
const MAX_VISIBLE: usize = 3;

/// The kind of toast, which determines its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
}

impl NotificationKind {
    fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Info => "ℹ",
            NotificationKind::Success => "✓",
        }
    }
}

/// A single toast.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The message.
    pub message: String,
    /// The kind of toast.
    pub kind: NotificationKind,
    created_at: Instant,
}

impl Notification {
    fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > TOAST_DURATION
    }
}

/// Queue of visible toasts.
#[derive(Debug, Default)]
pub struct NotificationManager {
    notifications: VecDeque<Notification>,
}

impl NotificationManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        while self.notifications.len() > MAX_VISIBLE {
            self.notifications.pop_front();
        }
    }

    /// Add an info toast.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationKind::Info));
    }

    /// Add a success toast.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationKind::Success));
    }

    /// Drop expired toasts. Called on every tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    /// Iterate over visible toasts, oldest first.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Render the toasts stacked in the bottom-right corner.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let width = 44u16.min(area.width.saturating_sub(2));
        let mut y = area.y + area.height.saturating_sub(1);

        for notification in self.notifications.iter().rev() {
            if y < area.y + 3 {
                break;
            }
            y -= 3;
            let rect = Rect::new(area.x + area.width.saturating_sub(width + 1), y, width, 3);

            let color = match notification.kind {
                NotificationKind::Info => t.accent,
                NotificationKind::Success => t.success,
            };
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", notification.kind.icon()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(notification.message.as_str(), Style::default().fg(color)),
            ]);

            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(line).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color)),
                ),
                rect,
            );
        }
    }
}
