//! The contacts table.
//!
//! Rendering is split in two steps. [`render_row`] turns a contact into an
//! immutable [`RowView`] holding display strings and the actions bound to
//! the contact's id; [`ContactTable`] keeps the ordered rows, keyed by id,
//! and draws them with ratatui. The table mirrors the last successful
//! server responses and is never treated as authoritative.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use tracing::warn;

use crate::api::Contact;
use crate::ui::theme::theme;

/// Column headers, in cell order.
pub const HEADERS: [&str; 5] = ["ID", "Name", "Birthday", "Email", "Actions"];

/// Label of the action cell.
const ACTIONS_LABEL: &str = "[e]dit [d]elete";

/// An action triggered from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Open the edit dialog for this contact.
    Edit(i64),
    /// Open the delete confirmation for this contact.
    Delete(i64),
}

/// Display projection of one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// The contact id the row is keyed by.
    pub id: i64,
    /// Display cells: id, name, birthday, email, actions.
    pub cells: [String; 5],
    /// Bound edit trigger.
    pub edit: RowAction,
    /// Bound delete trigger.
    pub delete: RowAction,
}

impl RowView {
    /// The display name cell.
    pub fn name(&self) -> &str {
        &self.cells[1]
    }

    /// The birthday cell.
    #[cfg(test)]
    pub fn birthday(&self) -> &str {
        &self.cells[2]
    }

    /// The email cell.
    #[cfg(test)]
    pub fn email(&self) -> &str {
        &self.cells[3]
    }
}

/// Build the row for a contact.
///
/// Missing optional values become empty cells.
pub fn render_row(contact: &Contact) -> RowView {
    RowView {
        id: contact.id,
        cells: [
            contact.id.to_string(),
            contact.display_name(),
            contact.birthday_display(),
            contact.email.clone(),
            ACTIONS_LABEL.to_string(),
        ],
        edit: RowAction::Edit(contact.id),
        delete: RowAction::Delete(contact.id),
    }
}

/// The live table of contact rows.
#[derive(Debug, Default)]
pub struct ContactTable {
    rows: Vec<RowView>,
    selected: usize,
}

impl ContactTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with the given contacts, in order.
    pub fn refresh(&mut self, contacts: &[Contact]) {
        self.rows.clear();
        self.rows.extend(contacts.iter().map(render_row));
        self.clamp_selection();
    }

    /// Add a row at the end and select it.
    pub fn append(&mut self, contact: &Contact) {
        self.rows.push(render_row(contact));
        self.selected = self.rows.len() - 1;
    }

    /// Swap the row with `id` for a fresh rendering of `contact`, in place.
    ///
    /// Returns false, leaving the table unchanged, if no row has that id.
    pub fn replace_row(&mut self, id: i64, contact: &Contact) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.rows[idx] = render_row(contact);
                true
            }
            None => {
                warn!(contact_id = id, "No row to replace, table out of sync");
                false
            }
        }
    }

    /// Remove the row with `id`.
    ///
    /// Returns false, leaving the table unchanged, if no row has that id.
    pub fn remove_row(&mut self, id: i64) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.rows.remove(idx);
                self.clamp_selection();
                true
            }
            None => {
                warn!(contact_id = id, "No row to remove, table out of sync");
                false
            }
        }
    }

    /// Remove every row.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.selected = 0;
    }

    /// The rows, in display order.
    #[cfg(test)]
    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the row with `id`.
    pub fn position(&self, id: i64) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// The row with `id`.
    pub fn row(&self, id: i64) -> Option<&RowView> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Index of the selected row.
    #[cfg(test)]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected row.
    pub fn selected_row(&self) -> Option<&RowView> {
        self.rows.get(self.selected)
    }

    /// Move the selection down.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    /// Move the selection up.
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Select the first row.
    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    /// Select the last row.
    pub fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    /// Draw the table.
    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let t = theme();

        let header = Row::new(
            HEADERS
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().fg(t.accent))
        .bottom_margin(1);

        let rows = self.rows.iter().map(|row| {
            Row::new(row.cells.iter().enumerate().map(|(i, cell)| {
                let style = if i == 4 {
                    Style::default().fg(t.dim)
                } else {
                    Style::default().fg(t.fg)
                };
                Cell::from(cell.as_str()).style(style)
            }))
        });

        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Percentage(35),
            Constraint::Length(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(Span::styled(format!(" {} ", title), t.title_style(true)))
                    .borders(Borders::ALL)
                    .border_style(t.border_style(false)),
            )
            .highlight_style(
                Style::default()
                    .fg(t.selection_fg)
                    .bg(t.selection_bg)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = TableState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn contact(id: i64, name: &str) -> Contact {
        Contact {
            id,
            first_name: name.to_string(),
            last_name: None,
            full_name: Some(name.to_string()),
            email: format!("{}@x.com", name.to_lowercase()),
            birthday: None,
            address: None,
            phones: Vec::new(),
        }
    }

    fn ids(table: &ContactTable) -> Vec<i64> {
        table.rows().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_render_row_formats_birthday() {
        let mut c = contact(1, "A");
        c.email = "a@x.com".to_string();
        c.birthday = NaiveDate::from_ymd_opt(2020, 1, 2);

        let row = render_row(&c);
        assert_eq!(row.cells[0], "1");
        assert_eq!(row.birthday(), "02.01.2020");
        assert_eq!(row.email(), "a@x.com");
        assert_eq!(row.edit, RowAction::Edit(1));
        assert_eq!(row.delete, RowAction::Delete(1));
    }

    #[test]
    fn test_render_row_missing_values_are_empty() {
        let c = Contact {
            id: 9,
            first_name: "Solo".to_string(),
            last_name: None,
            full_name: None,
            email: "solo@x.com".to_string(),
            birthday: None,
            address: None,
            phones: Vec::new(),
        };
        let row = render_row(&c);

        assert_eq!(row.name(), "Solo");
        assert_eq!(row.birthday(), "");
        for cell in &row.cells {
            assert!(!cell.contains("null"));
            assert!(!cell.contains("None"));
            assert!(!cell.contains("undefined"));
        }
    }

    #[test]
    fn test_refresh_replaces_all_rows() {
        let mut table = ContactTable::new();
        table.refresh(&[contact(1, "A"), contact(2, "B"), contact(3, "C")]);
        table.select_last();

        table.refresh(&[contact(7, "G")]);
        assert_eq!(ids(&table), vec![7]);
        assert_eq!(table.selected_index(), 0);

        table.refresh(&[]);
        assert!(table.is_empty());
        assert!(table.selected_row().is_none());
    }

    #[test]
    fn test_append_adds_exactly_one_row() {
        let mut table = ContactTable::new();
        table.refresh(&[contact(1, "A")]);
        table.append(&contact(5, "E"));

        assert_eq!(ids(&table), vec![1, 5]);
        assert_eq!(table.selected_row().unwrap().id, 5);
    }

    #[test]
    fn test_replace_row_keeps_position() {
        let mut table = ContactTable::new();
        table.refresh(&[contact(1, "A"), contact(2, "B"), contact(3, "C")]);

        assert!(table.replace_row(2, &contact(2, "Bee")));
        assert_eq!(ids(&table), vec![1, 2, 3]);
        assert_eq!(table.rows()[1].name(), "Bee");
    }

    #[test]
    fn test_replace_missing_row_is_noop() {
        let mut table = ContactTable::new();
        table.refresh(&[contact(1, "A")]);

        assert!(!table.replace_row(99, &contact(99, "Z")));
        assert_eq!(ids(&table), vec![1]);
        assert_eq!(table.rows()[0].name(), "A");
    }

    #[test]
    fn test_remove_row() {
        let mut table = ContactTable::new();
        table.refresh(&[contact(1, "A"), contact(2, "B")]);
        table.select_last();

        assert!(table.remove_row(2));
        assert!(table.row(2).is_none());
        assert_eq!(table.selected_index(), 0);

        assert!(!table.remove_row(2));
        assert_eq!(ids(&table), vec![1]);
    }

    #[test]
    fn test_selection_bounds() {
        let mut table = ContactTable::new();
        table.select_next();
        assert_eq!(table.selected_index(), 0);

        table.refresh(&[contact(1, "A"), contact(2, "B")]);
        table.select_next();
        table.select_next();
        assert_eq!(table.selected_index(), 1);
        table.select_prev();
        table.select_prev();
        assert_eq!(table.selected_index(), 0);
    }
}
