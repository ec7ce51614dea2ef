//! Login and signup dialogs.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::api::types::SignupRequest;
use crate::ui::components::{centered_rect, TextInput};
use crate::ui::theme::theme;

/// Draw the frame shared by both dialogs and return its inner area.
fn render_dialog_frame(frame: &mut Frame, area: Rect, title: &str, height: u16) -> Rect {
    let t = theme();
    let dialog_area = centered_rect(area, 56u16.min(area.width.saturating_sub(4)), height);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.accent));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);
    inner
}

fn render_footer(frame: &mut Frame, area: Rect, error: Option<&str>, hint: &str, busy: bool) {
    let t = theme();
    let span = if let Some(error) = error {
        Span::styled(error, Style::default().fg(t.error))
    } else if busy {
        Span::styled("Waiting for server...", Style::default().fg(t.warning))
    } else {
        Span::styled(hint, Style::default().fg(t.dim))
    };
    frame.render_widget(Paragraph::new(span), area);
}

// ============================================================================
// Login
// ============================================================================

/// Actions returned from the login dialog.
#[derive(Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// Log in with these credentials.
    Submit { email: String, password: String },
    /// Resend the confirmation email.
    RequestEmail(String),
    /// Send a password reset email.
    ForgotPassword(String),
    /// Switch to the signup dialog.
    OpenSignup,
    /// Close the dialog.
    Cancel,
}

impl fmt::Debug for LoginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginAction::Submit { email, .. } => f
                .debug_struct("Submit")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            LoginAction::RequestEmail(email) => f.debug_tuple("RequestEmail").field(email).finish(),
            LoginAction::ForgotPassword(email) => {
                f.debug_tuple("ForgotPassword").field(email).finish()
            }
            LoginAction::OpenSignup => f.write_str("OpenSignup"),
            LoginAction::Cancel => f.write_str("Cancel"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoginField {
    #[default]
    Email,
    Password,
}

/// The login dialog.
#[derive(Debug, Default)]
pub struct LoginFormView {
    visible: bool,
    focus: LoginField,
    email: TextInput,
    password: TextInput,
    error: Option<String>,
    submitting: bool,
}

impl LoginFormView {
    /// Create a hidden dialog.
    pub fn new() -> Self {
        Self {
            password: TextInput::masked(),
            ..Self::default()
        }
    }

    /// Open the dialog, keeping a previously typed email.
    pub fn show(&mut self) {
        let email = self.email.value().to_string();
        *self = Self::new();
        self.email.set_value(email);
        self.visible = true;
    }

    /// Close the dialog and forget the password.
    pub fn hide(&mut self) {
        self.visible = false;
        self.submitting = false;
        self.error = None;
        self.password.clear();
    }

    /// Whether the dialog is open.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set the submitting state.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Whether a request is in flight.
    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The typed email.
    #[cfg(test)]
    pub fn email(&self) -> &str {
        self.email.value()
    }

    /// The validation message being shown.
    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn require_email(&mut self) -> Option<String> {
        let email = self.email.value().trim().to_string();
        if email.is_empty() {
            self.error = Some("Email is required".to_string());
            None
        } else {
            Some(email)
        }
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<LoginAction> {
        if !self.visible {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.hide();
                Some(LoginAction::Cancel)
            }
            _ if self.submitting => None,
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) | (KeyCode::Down, _) | (KeyCode::Up, _) => {
                self.focus = match self.focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
                None
            }
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.hide();
                Some(LoginAction::OpenSignup)
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                let email = self.require_email()?;
                self.error = None;
                self.submitting = true;
                Some(LoginAction::RequestEmail(email))
            }
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => {
                let email = self.require_email()?;
                self.error = None;
                self.submitting = true;
                Some(LoginAction::ForgotPassword(email))
            }
            (KeyCode::Enter, _) => {
                let email = self.require_email()?;
                if self.password.is_empty() {
                    self.error = Some("Password is required".to_string());
                    return None;
                }
                self.error = None;
                self.submitting = true;
                Some(LoginAction::Submit {
                    email,
                    password: self.password.value().to_string(),
                })
            }
            _ => {
                let input = match self.focus {
                    LoginField::Email => &mut self.email,
                    LoginField::Password => &mut self.password,
                };
                if input.handle_input(key) {
                    self.error = None;
                }
                None
            }
        }
    }

    /// Render the dialog.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let inner = render_dialog_frame(frame, area, "Log in", 11);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        self.email
            .render_with_label(frame, chunks[0], "Email", self.focus == LoginField::Email);
        self.password.render_with_label(
            frame,
            chunks[1],
            "Password",
            self.focus == LoginField::Password,
        );
        render_footer(
            frame,
            chunks[2],
            self.error.as_deref(),
            "[Enter] Log in  [Esc] Cancel",
            self.submitting,
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                "[C-n] Sign up  [C-r] Resend email  [C-f] Forgot password",
                Style::default().fg(theme().dim),
            )),
            chunks[3],
        );
    }
}

// ============================================================================
// Signup
// ============================================================================

/// Actions returned from the signup dialog.
#[derive(Debug, Clone)]
pub enum SignupAction {
    /// Register an account.
    Submit(SignupRequest),
    /// Close the dialog.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SignupField {
    #[default]
    Username,
    Email,
    Password,
}

impl SignupField {
    fn next(self) -> Self {
        match self {
            SignupField::Username => SignupField::Email,
            SignupField::Email => SignupField::Password,
            SignupField::Password => SignupField::Username,
        }
    }

    fn prev(self) -> Self {
        match self {
            SignupField::Username => SignupField::Password,
            SignupField::Email => SignupField::Username,
            SignupField::Password => SignupField::Email,
        }
    }
}

/// The signup dialog.
#[derive(Debug, Default)]
pub struct SignupFormView {
    visible: bool,
    focus: SignupField,
    username: TextInput,
    email: TextInput,
    password: TextInput,
    error: Option<String>,
    submitting: bool,
}

impl SignupFormView {
    /// Create a hidden dialog.
    pub fn new() -> Self {
        Self {
            username: TextInput::new().with_placeholder("optional"),
            password: TextInput::masked(),
            ..Self::default()
        }
    }

    /// Open an empty dialog.
    pub fn show(&mut self) {
        *self = Self::new();
        self.visible = true;
    }

    /// Close the dialog and clear it.
    pub fn hide(&mut self) {
        *self = Self::new();
    }

    /// Whether the dialog is open.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set the submitting state.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Whether a request is in flight.
    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The typed email.
    #[cfg(test)]
    pub fn email(&self) -> &str {
        self.email.value()
    }

    fn to_request(&self) -> Result<SignupRequest, String> {
        let email = self.email.value().trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        let username = self.username.value().trim();
        Ok(SignupRequest {
            username: (!username.is_empty()).then(|| username.to_string()),
            email: email.to_string(),
            password: self.password.value().to_string(),
        })
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SignupAction> {
        if !self.visible {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.hide();
                Some(SignupAction::Cancel)
            }
            _ if self.submitting => None,
            (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.focus = self.focus.next();
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) | (KeyCode::Up, _) => {
                self.focus = self.focus.prev();
                None
            }
            (KeyCode::Enter, _) => match self.to_request() {
                Ok(request) => {
                    self.error = None;
                    self.submitting = true;
                    Some(SignupAction::Submit(request))
                }
                Err(message) => {
                    self.error = Some(message);
                    None
                }
            },
            _ => {
                let input = match self.focus {
                    SignupField::Username => &mut self.username,
                    SignupField::Email => &mut self.email,
                    SignupField::Password => &mut self.password,
                };
                if input.handle_input(key) {
                    self.error = None;
                }
                None
            }
        }
    }

    /// Render the dialog.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let inner = render_dialog_frame(frame, area, "Sign up", 13);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(inner);

        self.username.render_with_label(
            frame,
            chunks[0],
            "Username",
            self.focus == SignupField::Username,
        );
        self.email
            .render_with_label(frame, chunks[1], "Email", self.focus == SignupField::Email);
        self.password.render_with_label(
            frame,
            chunks[2],
            "Password",
            self.focus == SignupField::Password,
        );
        render_footer(
            frame,
            chunks[3],
            self.error.as_deref(),
            "[Enter] Sign up  [Esc] Cancel",
            self.submitting,
        );
    }
}
