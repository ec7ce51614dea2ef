//! Modal dialog components: the alert box and the delete confirmation.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::theme;

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// A blocking alert, the terminal counterpart of `window.alert`.
///
/// While visible it swallows all input; Enter or Esc dismisses it and
/// hands control back to whatever dialog is underneath.
#[derive(Debug, Default)]
pub struct AlertDialog {
    message: Option<String>,
}

impl AlertDialog {
    /// Create a hidden alert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a message.
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Hide the alert.
    pub fn dismiss(&mut self) {
        self.message = None;
    }

    /// Whether the alert is visible.
    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    /// The message being shown.
    #[cfg(test)]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Handle a key. Returns true when the alert was dismissed.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            self.dismiss();
            true
        } else {
            false
        }
    }

    /// Render the alert on top of everything else.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(message) = &self.message else {
            return;
        };

        let t = theme();
        let width = 56u16.min(area.width.saturating_sub(4));
        let text_width = width.saturating_sub(4).max(1) as usize;
        let lines = (message.chars().count() / text_width) as u16 + 1;
        let dialog = centered_rect(area, width, lines + 5);

        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(Span::styled(
                " Alert ",
                Style::default().fg(t.error).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.error));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(message.as_str())
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(Span::styled("[Enter] OK", Style::default().fg(t.dim)))
                .alignment(Alignment::Center),
            chunks[1],
        );
    }
}

/// Result of a key press in the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// The user confirmed deleting this contact.
    Confirm(i64),
    /// The user backed out.
    Cancel,
}

/// Confirmation dialog for deleting a contact.
///
/// The dialog stays open while the delete request is in flight and after
/// a failure; the caller closes it on success.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    /// The contact to delete, and its display name.
    target: Option<(i64, String)>,
    /// Whether a delete request is in flight.
    submitting: bool,
}

impl ConfirmDialog {
    /// Create a hidden dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask about deleting a contact.
    pub fn show(&mut self, id: i64, name: impl Into<String>) {
        self.target = Some((id, name.into()));
        self.submitting = false;
    }

    /// Close the dialog.
    pub fn hide(&mut self) {
        self.target = None;
        self.submitting = false;
    }

    /// Whether the dialog is visible.
    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    /// The contact id the dialog is about.
    pub fn target_id(&self) -> Option<i64> {
        self.target.as_ref().map(|(id, _)| *id)
    }

    /// Mark the request as finished, successful or not.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Whether a delete request is in flight.
    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Handle a key press.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        let id = self.target_id()?;
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.hide();
                Some(ConfirmAction::Cancel)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') if !self.submitting => {
                self.submitting = true;
                Some(ConfirmAction::Confirm(id))
            }
            _ => None,
        }
    }

    /// Render the dialog.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some((id, name)) = &self.target else {
            return;
        };

        let t = theme();
        let dialog = centered_rect(area, 50, 7);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(Span::styled(
                " Delete contact ",
                Style::default().fg(t.warning).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.warning));

        let hint = if self.submitting {
            Span::styled("Deleting...", Style::default().fg(t.warning))
        } else {
            Span::styled("[y/Enter] Delete   [n/Esc] Cancel", Style::default().fg(t.dim))
        };

        let text = vec![
            Line::raw(""),
            Line::raw(format!("Delete #{} {}?", id, name)),
            Line::raw(""),
            Line::from(hint),
        ];

        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            dialog,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(area, 40, 20);
        assert_eq!(centered, Rect::new(30, 15, 40, 20));
    }

    #[test]
    fn test_centered_rect_larger_than_area() {
        let area = Rect::new(0, 0, 30, 20);
        let centered = centered_rect(area, 50, 30);
        assert_eq!(centered.width, 30);
        assert_eq!(centered.height, 20);
    }

    #[test]
    fn test_alert_show_and_dismiss() {
        let mut alert = AlertDialog::new();
        assert!(!alert.is_visible());

        alert.show("Input data is invalid");
        assert_eq!(alert.message(), Some("Input data is invalid"));

        assert!(!alert.handle_input(key(KeyCode::Char('x'))));
        assert!(alert.is_visible());
        assert!(alert.handle_input(key(KeyCode::Enter)));
        assert!(!alert.is_visible());
    }

    #[test]
    fn test_confirm_dialog_flow() {
        let mut dialog = ConfirmDialog::new();
        assert_eq!(dialog.handle_input(key(KeyCode::Enter)), None);

        dialog.show(5, "Ben Smith");
        assert_eq!(
            dialog.handle_input(key(KeyCode::Char('y'))),
            Some(ConfirmAction::Confirm(5))
        );
        assert!(dialog.is_submitting());
        // A second confirm while in flight is ignored.
        assert_eq!(dialog.handle_input(key(KeyCode::Enter)), None);
        assert!(dialog.is_visible());
    }

    #[test]
    fn test_confirm_dialog_cancel() {
        let mut dialog = ConfirmDialog::new();
        dialog.show(5, "Ben");
        assert_eq!(
            dialog.handle_input(key(KeyCode::Esc)),
            Some(ConfirmAction::Cancel)
        );
        assert!(!dialog.is_visible());
    }
}
