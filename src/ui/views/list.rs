//! Contact list view: filter bar, table and key hints.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::{Contact, ContactFilter, FilterType};
use crate::ui::components::{ContactTable, RowAction, TextInput};
use crate::ui::theme::theme;

/// Actions returned from the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    /// Open the edit dialog for a contact.
    Edit(i64),
    /// Ask before deleting a contact.
    Delete(i64),
    /// Open an empty create dialog.
    Create,
    /// Reload the list with the current filter.
    Refresh,
    /// Reload the list with a new filter.
    ApplyFilter(ContactFilter),
    /// Open the login dialog.
    Login,
    /// Open the signup dialog.
    Signup,
    /// Forget the stored session.
    Logout,
    /// Quit the application.
    Quit,
}

/// The main screen.
#[derive(Debug)]
pub struct ContactListView {
    table: ContactTable,
    filter_type: FilterType,
    filter_input: TextInput,
    /// Whether keys go to the filter text box.
    editing_filter: bool,
    loading: bool,
}

impl Default for ContactListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactListView {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            table: ContactTable::new(),
            filter_type: FilterType::default(),
            filter_input: TextInput::new().with_placeholder("search text"),
            editing_filter: false,
            loading: false,
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &ContactTable {
        &self.table
    }

    /// The underlying table, mutably.
    pub fn table_mut(&mut self) -> &mut ContactTable {
        &mut self.table
    }

    /// Replace the rows with a fresh listing.
    pub fn set_contacts(&mut self, contacts: &[Contact]) {
        self.table.refresh(contacts);
        self.loading = false;
    }

    /// Set the loading state.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether a list request is in flight.
    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the filter text box has focus.
    #[cfg(test)]
    pub fn is_editing_filter(&self) -> bool {
        self.editing_filter
    }

    /// The filter built from the filter bar.
    pub fn filter(&self) -> ContactFilter {
        ContactFilter::new(self.filter_type, self.filter_input.value())
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ListAction> {
        if self.editing_filter {
            return self.handle_filter_input(key);
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(ListAction::Quit),
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                self.table.select_next();
                None
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                self.table.select_prev();
                None
            }
            (KeyCode::Home, _) | (KeyCode::Char('g'), KeyModifiers::NONE) => {
                self.table.select_first();
                None
            }
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => {
                self.table.select_last();
                None
            }
            (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _) => self
                .table
                .selected_row()
                .map(|row| row_action(row.edit)),
            (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => self
                .table
                .selected_row()
                .map(|row| row_action(row.delete)),
            (KeyCode::Char('n'), KeyModifiers::NONE) => Some(ListAction::Create),
            (KeyCode::Char('r'), KeyModifiers::NONE) => Some(ListAction::Refresh),
            (KeyCode::Char('l'), KeyModifiers::NONE) => Some(ListAction::Login),
            (KeyCode::Char('s'), KeyModifiers::NONE) => Some(ListAction::Signup),
            (KeyCode::Char('L'), _) => Some(ListAction::Logout),
            (KeyCode::Char('f'), KeyModifiers::NONE) => {
                self.filter_type = self.filter_type.next();
                self.filter_changed()
            }
            (KeyCode::Char('F'), _) => {
                self.filter_type = self.filter_type.prev();
                self.filter_changed()
            }
            (KeyCode::Char('/'), _) => {
                if !self.filter_type.takes_text() {
                    self.filter_type = FilterType::FirstName;
                }
                self.editing_filter = true;
                None
            }
            _ => None,
        }
    }

    /// A filter type change only reloads when no text is needed.
    fn filter_changed(&mut self) -> Option<ListAction> {
        if self.filter_type.takes_text() && self.filter_input.is_empty() {
            None
        } else {
            Some(ListAction::ApplyFilter(self.filter()))
        }
    }

    fn handle_filter_input(&mut self, key: KeyEvent) -> Option<ListAction> {
        match key.code {
            KeyCode::Enter => {
                self.editing_filter = false;
                Some(ListAction::ApplyFilter(self.filter()))
            }
            KeyCode::Esc => {
                self.editing_filter = false;
                None
            }
            KeyCode::Tab => {
                self.filter_type = self.filter_type.next();
                None
            }
            _ => {
                self.filter_input.handle_input(key);
                None
            }
        }
    }

    /// Render the view.
    pub fn render(&self, frame: &mut Frame, area: Rect, status: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_filter_bar(frame, chunks[0]);

        let title = if self.loading {
            "Contacts (loading...)".to_string()
        } else {
            format!("Contacts ({})", self.table.len())
        };
        self.table.render(frame, chunks[1], &title);

        self.render_footer(frame, chunks[2], status);
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let label = format!("Filter: {} [f]", self.filter_type.label());
        if self.filter_type.takes_text() || self.editing_filter {
            self.filter_input
                .render_with_label(frame, area, &label, self.editing_filter);
        } else {
            let t = theme();
            let text = match self.filter_type {
                FilterType::UpcomingBirthdays => "birthdays in the coming days",
                _ => "every contact",
            };
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(t.dim)))
                .block(
                    Block::default()
                        .title(Span::styled(format!(" {} ", label), t.title_style(false)))
                        .borders(Borders::ALL)
                        .border_style(t.border_style(false)),
                ),
                area,
            );
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, status: &str) {
        let t = theme();
        let hints: &[(&str, &str)] = if self.editing_filter {
            &[("Enter", "apply"), ("Tab", "filter type"), ("Esc", "close")]
        } else {
            &[
                ("n", "new"),
                ("e", "edit"),
                ("d", "delete"),
                ("/", "search"),
                ("r", "reload"),
                ("l", "login"),
                ("L", "logout"),
                ("q", "quit"),
            ]
        };

        let mut spans = vec![Span::styled(
            format!(" {} ", status),
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        )];
        for (key, desc) in hints {
            spans.push(Span::styled(format!(" {}", key), Style::default().fg(t.warning)));
            spans.push(Span::styled(format!(" {}", desc), Style::default().fg(t.dim)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn row_action(action: RowAction) -> ListAction {
    match action {
        RowAction::Edit(id) => ListAction::Edit(id),
        RowAction::Delete(id) => ListAction::Delete(id),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn contact(id: i64, first: &str, email: &str) -> Contact {
        Contact {
            id,
            first_name: first.to_string(),
            last_name: None,
            full_name: None,
            email: email.to_string(),
            birthday: None,
            address: None,
            phones: Vec::new(),
        }
    }

    #[test]
    fn test_row_keys_target_selected_contact() {
        let mut view = ContactListView::new();
        assert_eq!(view.handle_input(key(KeyCode::Char('e'))), None);

        view.set_contacts(&[contact(1, "A", "a@x.com"), contact(2, "B", "b@x.com")]);
        view.handle_input(key(KeyCode::Down));
        assert_eq!(
            view.handle_input(key(KeyCode::Char('e'))),
            Some(ListAction::Edit(2))
        );
        assert_eq!(
            view.handle_input(key(KeyCode::Char('d'))),
            Some(ListAction::Delete(2))
        );
    }

    #[test]
    fn test_search_applies_filter() {
        let mut view = ContactListView::new();
        view.handle_input(key(KeyCode::Char('/')));
        assert!(view.is_editing_filter());

        for c in "ann".chars() {
            assert_eq!(view.handle_input(key(KeyCode::Char(c))), None);
        }
        let action = view.handle_input(key(KeyCode::Enter));
        assert_eq!(
            action,
            Some(ListAction::ApplyFilter(ContactFilter::new(
                FilterType::FirstName,
                "ann"
            )))
        );
        assert!(!view.is_editing_filter());
    }

    #[test]
    fn test_cycling_to_birthdays_reloads() {
        let mut view = ContactListView::new();
        // All -> FirstName with no text does not reload.
        assert_eq!(view.handle_input(key(KeyCode::Char('f'))), None);
        view.handle_input(key(KeyCode::Char('f')));
        view.handle_input(key(KeyCode::Char('f')));
        let action = view.handle_input(key(KeyCode::Char('f')));
        assert_eq!(
            action,
            Some(ListAction::ApplyFilter(ContactFilter::new(
                FilterType::UpcomingBirthdays,
                ""
            )))
        );
    }

    #[test]
    fn test_render_shows_rows() {
        let mut view = ContactListView::new();
        view.set_contacts(&[contact(42, "Ann", "ann@x.com")]);

        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area(), "local"))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Contacts (1)"));
        assert!(text.contains("42"));
        assert!(text.contains("ann@x.com"));
        assert!(text.contains("[e]dit [d]elete"));
    }
}
