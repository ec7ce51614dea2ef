//! Create/edit contact dialog.
//!
//! One dialog serves both modes. In edit mode the caller fetches the full
//! contact first and opens the dialog with it, so fields the list endpoint
//! may omit (phones, address) are populated from the server. The dialog
//! stays open while the save is in flight and after a failed save; the
//! caller closes it on success.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::api::types::{parse_birthday, phones_to_str, str_to_phones, BIRTHDAY_WIRE_FORMAT};
use crate::api::{Contact, ContactInput};
use crate::ui::components::{centered_rect, TextInput};
use crate::ui::theme::theme;

// ============================================================================
// Form mode and fields
// ============================================================================

/// Which kind of save the dialog performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// POST a new contact.
    Create,
    /// PUT over an existing contact.
    Edit(i64),
}

impl FormMode {
    /// The contact id to save to, `None` when creating.
    pub fn contact_id(&self) -> Option<i64> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(*id),
        }
    }
}

/// Form fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactField {
    #[default]
    FirstName,
    LastName,
    Birthday,
    Email,
    Phones,
    Address,
}

impl ContactField {
    const ORDER: [ContactField; 6] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Birthday,
        ContactField::Email,
        ContactField::Phones,
        ContactField::Address,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    /// The next field, wrapping around.
    pub fn next(&self) -> ContactField {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    /// The previous field, wrapping around.
    pub fn prev(&self) -> ContactField {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn label(&self) -> &'static str {
        match self {
            ContactField::FirstName => "First name *",
            ContactField::LastName => "Last name",
            ContactField::Birthday => "Birthday (YYYY-MM-DD)",
            ContactField::Email => "Email *",
            ContactField::Phones => "Phones (comma separated)",
            ContactField::Address => "Address",
        }
    }
}

// ============================================================================
// Contact Form View
// ============================================================================

/// Actions returned from the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactFormAction {
    /// Save the contact. `id` is `None` for a create.
    Submit {
        id: Option<i64>,
        input: ContactInput,
    },
    /// Close the dialog without saving.
    Cancel,
}

/// The create/edit contact dialog.
#[derive(Debug, Default)]
pub struct ContactFormView {
    mode: Option<FormMode>,
    focus: ContactField,
    first_name: TextInput,
    last_name: TextInput,
    birthday: TextInput,
    email: TextInput,
    phones: TextInput,
    address: TextInput,
    /// Client-side validation message.
    error: Option<String>,
    submitting: bool,
}

impl ContactFormView {
    /// Create a hidden form.
    pub fn new() -> Self {
        Self {
            birthday: TextInput::new().with_placeholder("1990-05-17"),
            phones: TextInput::new().with_placeholder("+380501234567, 0441234567"),
            ..Self::default()
        }
    }

    /// Open an empty form for a new contact.
    pub fn open_create(&mut self) {
        self.reset();
        self.mode = Some(FormMode::Create);
    }

    /// Open the form populated with a fetched contact.
    pub fn open_edit(&mut self, contact: &Contact) {
        self.reset();
        self.mode = Some(FormMode::Edit(contact.id));
        self.first_name.set_value(contact.first_name.as_str());
        self.last_name
            .set_value(contact.last_name.clone().unwrap_or_default());
        self.birthday.set_value(
            contact
                .birthday
                .map(|d| d.format(BIRTHDAY_WIRE_FORMAT).to_string())
                .unwrap_or_default(),
        );
        self.email.set_value(contact.email.as_str());
        self.phones.set_value(phones_to_str(&contact.phones));
        self.address
            .set_value(contact.address.clone().unwrap_or_default());
    }

    /// Close the form and clear every field.
    pub fn hide(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the dialog is open.
    pub fn is_visible(&self) -> bool {
        self.mode.is_some()
    }

    /// The open mode, if any.
    pub fn mode(&self) -> Option<FormMode> {
        self.mode
    }

    /// The focused field.
    #[cfg(test)]
    pub fn focus(&self) -> ContactField {
        self.focus
    }

    /// The validation message being shown.
    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set the submitting state.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Whether a save is in flight.
    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn input(&self, field: ContactField) -> &TextInput {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Birthday => &self.birthday,
            ContactField::Email => &self.email,
            ContactField::Phones => &self.phones,
            ContactField::Address => &self.address,
        }
    }

    fn input_mut(&mut self, field: ContactField) -> &mut TextInput {
        match field {
            ContactField::FirstName => &mut self.first_name,
            ContactField::LastName => &mut self.last_name,
            ContactField::Birthday => &mut self.birthday,
            ContactField::Email => &mut self.email,
            ContactField::Phones => &mut self.phones,
            ContactField::Address => &mut self.address,
        }
    }

    /// Set a field value directly.
    #[cfg(test)]
    pub fn set_field(&mut self, field: ContactField, value: &str) {
        self.input_mut(field).set_value(value);
    }

    /// Read a field value.
    #[cfg(test)]
    pub fn field(&self, field: ContactField) -> &str {
        self.input(field).value()
    }

    /// Collect the fields into a request body.
    ///
    /// Blank optional fields become `None`; phones are split on commas.
    pub fn to_input(&self) -> Result<ContactInput, String> {
        let first_name = self.first_name.value().trim();
        if first_name.is_empty() {
            return Err("First name is required".to_string());
        }
        let email = self.email.value().trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        let birthday = parse_birthday(self.birthday.value())?;

        Ok(ContactInput {
            first_name: first_name.to_string(),
            last_name: non_blank(self.last_name.value()),
            birthday,
            email: email.to_string(),
            phones: str_to_phones(self.phones.value()),
            address: non_blank(self.address.value()),
        })
    }

    /// Handle keyboard input.
    ///
    /// Returns an optional action to be handled by the parent.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ContactFormAction> {
        let mode = self.mode?;

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.hide();
                Some(ContactFormAction::Cancel)
            }
            // Saving twice would create a duplicate contact.
            _ if self.submitting => None,
            (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.focus = self.focus.next();
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) | (KeyCode::Up, _) => {
                self.focus = self.focus.prev();
                None
            }
            (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                match self.to_input() {
                    Ok(input) => {
                        self.error = None;
                        self.submitting = true;
                        Some(ContactFormAction::Submit {
                            id: mode.contact_id(),
                            input,
                        })
                    }
                    Err(message) => {
                        self.error = Some(message);
                        None
                    }
                }
            }
            _ => {
                let focus = self.focus;
                if self.input_mut(focus).handle_input(key) {
                    self.error = None;
                }
                None
            }
        }
    }

    /// Render the dialog as a modal overlay.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(mode) = self.mode else {
            return;
        };

        let t = theme();
        let dialog_width = 64u16.min(area.width.saturating_sub(4));
        let dialog_height = 25u16.min(area.height.saturating_sub(2));
        let dialog_area = centered_rect(area, dialog_width, dialog_height);
        frame.render_widget(Clear, dialog_area);

        let title = match mode {
            FormMode::Create => " New contact ".to_string(),
            FormMode::Edit(id) => format!(" Edit contact #{} ", id),
        };
        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let mut constraints = vec![Constraint::Length(3); ContactField::ORDER.len()];
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in ContactField::ORDER.iter().enumerate() {
            self.input(*field)
                .render_with_label(frame, chunks[i], field.label(), self.focus == *field);
        }

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.as_str(), Style::default().fg(t.error))),
                chunks[6],
            );
        }

        let hint = if self.submitting {
            Span::styled("Saving...", Style::default().fg(t.warning))
        } else {
            Span::styled(
                "[Tab] Next  [Enter] Save  [Esc] Cancel",
                Style::default().fg(t.dim),
            )
        };
        frame.render_widget(Paragraph::new(hint), chunks[7]);
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
