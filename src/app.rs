//! Main application state and update logic.
//!
//! This module implements The Elm Architecture (TEA) pattern. Events and
//! API results go in through [`App::update`] and [`App::handle_api_message`];
//! each may return an [`ApiRequest`] for the main loop to run in the
//! background. [`App::view`] draws the current state.
//!
//! The contact table mirrors the last successful responses. Failed requests
//! never touch it: they raise the alert dialog and leave any open form as it
//! was so the user can retry.

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::api::{ApiError, Contact, ContactFilter, SharedSession, TokenPair};
use crate::events::Event;
use crate::tasks::{ApiMessage, ApiRequest};
use crate::ui::theme::theme;
use crate::ui::{
    AlertDialog, ConfirmAction, ConfirmDialog, ContactFormAction, ContactFormView,
    ContactListView, ListAction, LoginAction, LoginFormView, NotificationManager, SignupAction,
    SignupFormView,
};

/// The main application struct that holds all state.
pub struct App {
    /// Whether the application should quit.
    should_quit: bool,
    /// Where tokens are saved on login and cleared on logout.
    session: SharedSession,
    /// Whether the backend requires login at all.
    auth_enabled: bool,
    /// Whether a session is stored. Read from the store once at startup,
    /// then tracked through login and logout.
    logged_in: bool,
    /// Name of the active profile, for the header.
    profile_name: String,
    /// The filter of the last list request.
    filter: ContactFilter,
    /// Contact id whose edit dialog is waiting on a fetch.
    pending_edit: Option<i64>,
    list_view: ContactListView,
    contact_form: ContactFormView,
    login_form: LoginFormView,
    signup_form: SignupFormView,
    confirm_dialog: ConfirmDialog,
    alert: AlertDialog,
    notifications: NotificationManager,
}

impl App {
    /// Create a new application instance.
    pub fn new(session: SharedSession, auth_enabled: bool, profile_name: impl Into<String>) -> Self {
        let profile_name = profile_name.into();
        let logged_in = auth_enabled && session.is_logged_in();
        debug!(profile = %profile_name, auth_enabled, logged_in, "Creating application instance");

        Self {
            should_quit: false,
            session,
            auth_enabled,
            logged_in,
            profile_name,
            filter: ContactFilter::all(),
            pending_edit: None,
            list_view: ContactListView::new(),
            contact_form: ContactFormView::new(),
            login_form: LoginFormView::new(),
            signup_form: SignupFormView::new(),
            confirm_dialog: ConfirmDialog::new(),
            alert: AlertDialog::new(),
            notifications: NotificationManager::new(),
        }
    }

    /// The request to run when the app starts.
    ///
    /// Loads the table when a session exists (or no login is needed);
    /// otherwise opens the login dialog and waits.
    pub fn startup_command(&mut self) -> Option<ApiRequest> {
        if !self.auth_enabled || self.logged_in {
            Some(self.load_contacts())
        } else {
            info!("No stored session, asking for login");
            self.login_form.show();
            None
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Whether the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The list view.
    #[cfg(test)]
    pub fn list_view(&self) -> &ContactListView {
        &self.list_view
    }

    /// The create/edit dialog.
    #[cfg(test)]
    pub fn contact_form(&self) -> &ContactFormView {
        &self.contact_form
    }

    /// The login dialog.
    #[cfg(test)]
    pub fn login_form(&self) -> &LoginFormView {
        &self.login_form
    }

    /// The signup dialog.
    #[cfg(test)]
    pub fn signup_form(&self) -> &SignupFormView {
        &self.signup_form
    }

    /// The delete confirmation.
    #[cfg(test)]
    pub fn confirm_dialog(&self) -> &ConfirmDialog {
        &self.confirm_dialog
    }

    /// The alert text being shown, if any.
    #[cfg(test)]
    pub fn alert_message(&self) -> Option<&str> {
        self.alert.message()
    }

    fn show_alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "Showing alert");
        self.alert.show(message);
    }

    fn load_contacts(&mut self) -> ApiRequest {
        self.list_view.set_loading(true);
        ApiRequest::ListContacts(self.filter.clone())
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Handle a terminal event.
    pub fn update(&mut self, event: Event) -> Option<ApiRequest> {
        match event {
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key)
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
                None
            }
            Event::Tick => {
                self.notifications.tick();
                None
            }
        }
    }

    /// Route a key to the topmost visible layer.
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<ApiRequest> {
        if self.alert.is_visible() {
            self.alert.handle_input(key);
            return None;
        }

        if self.confirm_dialog.is_visible() {
            return match self.confirm_dialog.handle_input(key)? {
                ConfirmAction::Confirm(id) => {
                    info!(contact_id = id, "Deleting contact");
                    Some(ApiRequest::DeleteContact(id))
                }
                ConfirmAction::Cancel => None,
            };
        }

        if self.contact_form.is_visible() {
            return match self.contact_form.handle_input(key)? {
                ContactFormAction::Submit { id, input } => {
                    info!(contact_id = ?id, "Saving contact");
                    Some(ApiRequest::SaveContact { id, input })
                }
                ContactFormAction::Cancel => None,
            };
        }

        if self.signup_form.is_visible() {
            return match self.signup_form.handle_input(key)? {
                SignupAction::Submit(body) => Some(ApiRequest::Signup(body)),
                SignupAction::Cancel => None,
            };
        }

        if self.login_form.is_visible() {
            return match self.login_form.handle_input(key)? {
                LoginAction::Submit { email, password } => {
                    Some(ApiRequest::Login { email, password })
                }
                LoginAction::RequestEmail(email) => Some(ApiRequest::RequestEmail(email)),
                LoginAction::ForgotPassword(email) => Some(ApiRequest::ForgotPassword(email)),
                LoginAction::OpenSignup => {
                    self.signup_form.show();
                    None
                }
                LoginAction::Cancel => None,
            };
        }

        let action = self.list_view.handle_input(key)?;
        self.handle_list_action(action)
    }

    fn handle_list_action(&mut self, action: ListAction) -> Option<ApiRequest> {
        match action {
            ListAction::Quit => {
                info!("Quit requested");
                self.should_quit = true;
                None
            }
            ListAction::Create => {
                if let Some(id) = self.pending_edit.take() {
                    debug!(contact_id = id, "Create form replaces pending edit");
                }
                self.contact_form.open_create();
                None
            }
            ListAction::Edit(id) => {
                self.pending_edit = Some(id);
                Some(ApiRequest::FetchContact(id))
            }
            ListAction::Delete(id) => {
                let name = self
                    .list_view
                    .table()
                    .row(id)
                    .map(|row| row.name().to_string())
                    .unwrap_or_default();
                self.confirm_dialog.show(id, name);
                None
            }
            ListAction::Refresh => Some(self.load_contacts()),
            ListAction::ApplyFilter(filter) => {
                debug!(?filter, "Applying filter");
                self.filter = filter;
                Some(self.load_contacts())
            }
            ListAction::Login => {
                self.login_form.show();
                None
            }
            ListAction::Signup => {
                self.signup_form.show();
                None
            }
            ListAction::Logout => {
                self.logout();
                None
            }
        }
    }

    /// Forget the session and empty the table.
    fn logout(&mut self) {
        if !self.auth_enabled {
            self.notifications
                .info("This profile does not use authentication");
            return;
        }
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
            self.show_alert(e.alert_text());
            return;
        }
        info!("Logged out");
        self.logged_in = false;
        self.list_view.table_mut().clear();
        self.notifications.success("Logged out");
        self.login_form.show();
    }

    // ========================================================================
    // API results
    // ========================================================================

    /// Apply the result of a background request.
    pub fn handle_api_message(&mut self, message: ApiMessage) -> Option<ApiRequest> {
        match message {
            ApiMessage::ContactsListed(result) => {
                self.on_contacts_listed(result);
                None
            }
            ApiMessage::ContactFetched { id, result } => {
                self.on_contact_fetched(id, result);
                None
            }
            ApiMessage::ContactSaved { id, result } => {
                self.on_contact_saved(id, result);
                None
            }
            ApiMessage::ContactDeleted { id, result } => {
                self.on_contact_deleted(id, result);
                None
            }
            ApiMessage::LoggedIn(result) => self.on_logged_in(result),
            ApiMessage::SignedUp(result) => {
                self.signup_form.set_submitting(false);
                match result {
                    Ok(response) => {
                        info!("Signup accepted");
                        self.signup_form.hide();
                        self.notifications.success(
                            response
                                .text()
                                .unwrap_or("Account created, check your email to confirm it"),
                        );
                        self.login_form.show();
                    }
                    Err(e) => self.show_alert(e.alert_text()),
                }
                None
            }
            ApiMessage::EmailRequested(result) => {
                self.login_form.set_submitting(false);
                match result {
                    Ok(response) => self
                        .notifications
                        .info(response.text().unwrap_or("Check your email")),
                    Err(e) => self.show_alert(e.alert_text()),
                }
                None
            }
        }
    }

    fn on_contacts_listed(&mut self, result: Result<Vec<Contact>, ApiError>) {
        match result {
            Ok(contacts) => {
                debug!(count = contacts.len(), "Contacts listed");
                self.list_view.set_contacts(&contacts);
            }
            Err(e) => {
                self.list_view.set_loading(false);
                self.show_alert(e.alert_text());
            }
        }
    }

    fn on_contact_fetched(&mut self, id: i64, result: Result<Contact, ApiError>) {
        if self.pending_edit != Some(id) {
            debug!(contact_id = id, "Ignoring stale contact fetch");
            return;
        }
        self.pending_edit = None;

        match result {
            Ok(contact) => self.contact_form.open_edit(&contact),
            Err(e) => self.show_alert(e.alert_text()),
        }
    }

    fn on_contact_saved(&mut self, id: Option<i64>, result: Result<Contact, ApiError>) {
        let form_matches = self.contact_form.mode().map(|m| m.contact_id()) == Some(id);
        if form_matches {
            self.contact_form.set_submitting(false);
        }

        match result {
            Ok(contact) => {
                match id {
                    None => {
                        self.list_view.table_mut().append(&contact);
                        self.notifications.success("Contact created");
                    }
                    Some(id) => {
                        if self.list_view.table_mut().replace_row(id, &contact) {
                            self.notifications.success("Contact updated");
                        }
                    }
                }
                if form_matches {
                    self.contact_form.hide();
                }
            }
            Err(e) => self.show_alert(e.alert_text()),
        }
    }

    fn on_contact_deleted(&mut self, id: i64, result: Result<(), ApiError>) {
        let dialog_matches = self.confirm_dialog.target_id() == Some(id);

        match result {
            Ok(()) => {
                self.list_view.table_mut().remove_row(id);
                if dialog_matches {
                    self.confirm_dialog.hide();
                }
                self.notifications.success("Contact deleted");
            }
            Err(e) => {
                if dialog_matches {
                    self.confirm_dialog.set_submitting(false);
                }
                self.show_alert(e.alert_text());
            }
        }
    }

    fn on_logged_in(&mut self, result: Result<TokenPair, ApiError>) -> Option<ApiRequest> {
        self.login_form.set_submitting(false);

        let tokens = match result {
            Ok(tokens) => tokens,
            Err(e) => {
                self.show_alert(login_failure_text(&e));
                return None;
            }
        };

        if let Err(e) = self.session.save(&tokens) {
            warn!(error = %e, "Failed to store session");
            self.show_alert(e.alert_text());
            return None;
        }

        info!("Logged in");
        self.logged_in = true;
        self.login_form.hide();
        self.notifications.success("Logged in");
        Some(self.load_contacts())
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Render the application.
    pub fn view(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.list_view
            .render(frame, chunks[1], &self.profile_name);

        self.contact_form.render(frame, area);
        self.login_form.render(frame, area);
        self.signup_form.render(frame, area);
        self.confirm_dialog.render(frame, area);
        self.notifications.render(frame, area);
        self.alert.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let (status, color) = if !self.auth_enabled {
            ("no auth", t.dim)
        } else if self.logged_in {
            ("logged in", t.success)
        } else {
            ("logged out", t.warning)
        };

        let line = Line::from(vec![
            Span::styled(
                " LazyContacts ",
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("[{}] ", self.profile_name), Style::default().fg(t.fg)),
            Span::styled(status, Style::default().fg(color)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Alert text for a failed login.
///
/// A 401 here means wrong credentials or an unconfirmed account, and the
/// server's own message says which.
fn login_failure_text(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized(message) => message.clone(),
        other => other.alert_text(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::api::{ContactInput, FilterType, MemorySessionStore, SessionStore};
    use crate::ui::views::ContactField;

    /// Counts token reads, standing in for a slow keyring.
    #[derive(Debug, Default)]
    struct CountingSession {
        inner: MemorySessionStore,
        reads: AtomicUsize,
    }

    impl SessionStore for CountingSession {
        fn save(&self, tokens: &TokenPair) -> crate::api::error::Result<()> {
            self.inner.save(tokens)
        }

        fn access_token(&self) -> Option<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.access_token()
        }

        fn refresh_token(&self) -> Option<String> {
            self.inner.refresh_token()
        }

        fn clear(&self) -> crate::api::error::Result<()> {
            self.inner.clear()
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn contact(id: i64, first: &str) -> Contact {
        Contact {
            id,
            first_name: first.to_string(),
            last_name: None,
            full_name: None,
            email: format!("{}@x.com", first.to_lowercase()),
            birthday: None,
            address: None,
            phones: Vec::new(),
        }
    }

    fn row_ids(app: &App) -> Vec<i64> {
        app.list_view().table().rows().iter().map(|r| r.id).collect()
    }

    fn logged_in_app() -> (App, Arc<MemorySessionStore>) {
        let session = Arc::new(MemorySessionStore::with_tokens(&TokenPair::new("a", "r")));
        let app = App::new(session.clone(), true, "local");
        (app, session)
    }

    fn app_with_rows(ids: &[(i64, &str)]) -> App {
        let (mut app, _) = logged_in_app();
        let contacts: Vec<_> = ids.iter().map(|(id, name)| contact(*id, name)).collect();
        app.handle_api_message(ApiMessage::ContactsListed(Ok(contacts)));
        app
    }

    #[test]
    fn test_startup_logged_out_opens_login() {
        let session = Arc::new(MemorySessionStore::new());
        let mut app = App::new(session, true, "local");

        assert!(app.startup_command().is_none());
        assert!(app.login_form().is_visible());
    }

    #[test]
    fn test_startup_logged_in_lists() {
        let (mut app, _) = logged_in_app();
        match app.startup_command() {
            Some(ApiRequest::ListContacts(filter)) => assert_eq!(filter, ContactFilter::all()),
            other => panic!("unexpected request {:?}", other),
        }
        assert!(app.list_view().is_loading());
    }

    #[test]
    fn test_startup_without_auth_lists() {
        let mut app = App::new(Arc::new(MemorySessionStore::new()), false, "legacy");
        assert!(matches!(
            app.startup_command(),
            Some(ApiRequest::ListContacts(_))
        ));
    }

    #[test]
    fn test_quit() {
        let (mut app, _) = logged_in_app();
        app.update(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_login_success_stores_tokens_and_reloads() {
        let session = Arc::new(MemorySessionStore::new());
        let mut app = App::new(session.clone(), true, "local");
        app.startup_command();

        let next = app.handle_api_message(ApiMessage::LoggedIn(Ok(TokenPair::new(
            "access-1", "refresh-1",
        ))));

        assert!(matches!(next, Some(ApiRequest::ListContacts(_))));
        assert_eq!(session.access_token().as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
        assert!(!app.login_form().is_visible());
    }

    #[test]
    fn test_login_failure_shows_server_detail_and_keeps_session() {
        let (mut app, session) = logged_in_app();
        app.update(key(KeyCode::Char('l')));

        let next = app.handle_api_message(ApiMessage::LoggedIn(Err(ApiError::Unauthorized(
            "Invalid password".to_string(),
        ))));

        assert!(next.is_none());
        assert_eq!(app.alert_message(), Some("Invalid password"));
        assert_eq!(session.access_token().as_deref(), Some("a"));
        assert!(app.login_form().is_visible());
    }

    #[test]
    fn test_unauthorized_list_alerts_not_authenticated() {
        let (mut app, _) = logged_in_app();
        app.handle_api_message(ApiMessage::ContactsListed(Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        ))));

        assert_eq!(app.alert_message(), Some("Not authenticated"));
        assert!(!app.list_view().is_loading());
    }

    #[test]
    fn test_alert_swallows_keys_until_dismissed() {
        let (mut app, _) = logged_in_app();
        app.handle_api_message(ApiMessage::ContactsListed(Err(ApiError::Validation(
            "bad".to_string(),
        ))));

        assert!(app.update(key(KeyCode::Char('q'))).is_none());
        assert!(!app.should_quit());
        app.update(key(KeyCode::Enter));
        assert!(app.alert_message().is_none());
    }

    #[test]
    fn test_create_success_appends_one_row_and_closes_form() {
        let mut app = app_with_rows(&[(1, "Ann")]);
        app.update(key(KeyCode::Char('n')));
        assert!(app.contact_form().is_visible());

        app.handle_api_message(ApiMessage::ContactSaved {
            id: None,
            result: Ok(contact(2, "Ben")),
        });

        assert_eq!(row_ids(&app), vec![1, 2]);
        assert!(!app.contact_form().is_visible());
    }

    #[test]
    fn test_create_failure_keeps_form_and_table() {
        let mut app = app_with_rows(&[(1, "Ann")]);
        app.update(key(KeyCode::Char('n')));

        app.handle_api_message(ApiMessage::ContactSaved {
            id: None,
            result: Err(ApiError::Validation("value is not a valid email".to_string())),
        });

        assert_eq!(app.alert_message(), Some("Input data is invalid"));
        assert!(app.contact_form().is_visible());
        assert!(!app.contact_form().is_submitting());
        assert_eq!(row_ids(&app), vec![1]);
    }

    #[test]
    fn test_edit_flow_fetches_then_replaces_in_place() {
        let mut app = app_with_rows(&[(1, "Ann"), (2, "Ben"), (3, "Cid")]);
        app.update(key(KeyCode::Down));

        let request = app.update(key(KeyCode::Char('e')));
        assert!(matches!(request, Some(ApiRequest::FetchContact(2))));
        assert!(!app.contact_form().is_visible());

        let mut full = contact(2, "Ben");
        full.birthday = NaiveDate::from_ymd_opt(1990, 5, 17);
        app.handle_api_message(ApiMessage::ContactFetched {
            id: 2,
            result: Ok(full),
        });
        assert_eq!(
            app.contact_form().field(ContactField::Birthday),
            "1990-05-17"
        );

        match app.update(key(KeyCode::Enter)) {
            Some(ApiRequest::SaveContact { id, input }) => {
                assert_eq!(id, Some(2));
                assert_eq!(input.first_name, "Ben");
            }
            other => panic!("unexpected request {:?}", other),
        }

        app.handle_api_message(ApiMessage::ContactSaved {
            id: Some(2),
            result: Ok(contact(2, "Benjamin")),
        });
        assert_eq!(row_ids(&app), vec![1, 2, 3]);
        assert_eq!(app.list_view().table().rows()[1].name(), "Benjamin");
        assert!(!app.contact_form().is_visible());
    }

    #[test]
    fn test_create_form_wins_over_pending_edit_fetch() {
        let mut app = app_with_rows(&[(1, "Ann")]);
        assert!(matches!(
            app.update(key(KeyCode::Char('e'))),
            Some(ApiRequest::FetchContact(1))
        ));
        app.update(key(KeyCode::Char('n')));
        app.update(key(KeyCode::Char('Z')));

        app.handle_api_message(ApiMessage::ContactFetched {
            id: 1,
            result: Ok(contact(1, "Ann")),
        });

        assert!(app.contact_form().is_visible());
        assert_eq!(app.contact_form().mode().map(|m| m.contact_id()), Some(None));
        assert_eq!(app.contact_form().field(ContactField::FirstName), "Z");
    }

    #[test]
    fn test_edit_fetch_failure_alerts_without_form() {
        let mut app = app_with_rows(&[(1, "Ann")]);
        app.update(key(KeyCode::Char('e')));

        app.handle_api_message(ApiMessage::ContactFetched {
            id: 1,
            result: Err(ApiError::NotFound("Contact not found".to_string())),
        });

        assert_eq!(app.alert_message(), Some("Contact not found"));
        assert!(!app.contact_form().is_visible());
    }

    #[test]
    fn test_update_of_vanished_row_leaves_table() {
        let mut app = app_with_rows(&[(1, "Ann")]);
        app.handle_api_message(ApiMessage::ContactSaved {
            id: Some(9),
            result: Ok(contact(9, "Zed")),
        });
        assert_eq!(row_ids(&app), vec![1]);
    }

    #[test]
    fn test_delete_flow() {
        let mut app = app_with_rows(&[(1, "Ann"), (2, "Ben")]);
        app.update(key(KeyCode::Char('d')));
        assert_eq!(app.confirm_dialog().target_id(), Some(1));

        let request = app.update(key(KeyCode::Char('y')));
        assert!(matches!(request, Some(ApiRequest::DeleteContact(1))));

        app.handle_api_message(ApiMessage::ContactDeleted {
            id: 1,
            result: Ok(()),
        });
        assert_eq!(row_ids(&app), vec![2]);
        assert!(!app.confirm_dialog().is_visible());
    }

    #[test]
    fn test_delete_failure_keeps_row() {
        let mut app = app_with_rows(&[(1, "Ann")]);
        app.update(key(KeyCode::Char('d')));
        app.update(key(KeyCode::Char('y')));

        app.handle_api_message(ApiMessage::ContactDeleted {
            id: 1,
            result: Err(ApiError::Unauthorized("expired".to_string())),
        });

        assert_eq!(row_ids(&app), vec![1]);
        assert_eq!(app.alert_message(), Some("Not authenticated"));
        assert!(app.confirm_dialog().is_visible());
        assert!(!app.confirm_dialog().is_submitting());
    }

    #[test]
    fn test_logout_clears_session_and_table() {
        let (mut app, session) = logged_in_app();
        app.handle_api_message(ApiMessage::ContactsListed(Ok(vec![contact(1, "Ann")])));

        app.update(key(KeyCode::Char('L')));

        assert!(session.access_token().is_none());
        assert!(app.list_view().table().is_empty());
        assert!(app.login_form().is_visible());
    }

    #[test]
    fn test_filter_request_carries_filter() {
        let (mut app, _) = logged_in_app();
        app.update(key(KeyCode::Char('/')));
        app.update(key(KeyCode::Char('b')));
        let request = app.update(key(KeyCode::Enter));

        match request {
            Some(ApiRequest::ListContacts(filter)) => {
                assert_eq!(filter.filter_type, FilterType::FirstName);
                assert_eq!(filter.filter_str.as_deref(), Some("b"));
            }
            other => panic!("unexpected request {:?}", other),
        }

        // Reload keeps the filter.
        assert!(matches!(
            app.update(key(KeyCode::Char('r'))),
            Some(ApiRequest::ListContacts(ContactFilter { filter_type: FilterType::FirstName, .. }))
        ));
    }

    #[test]
    fn test_signup_success_returns_to_login() {
        let (mut app, _) = logged_in_app();
        app.update(key(KeyCode::Char('s')));
        assert!(app.signup_form().is_visible());

        app.handle_api_message(ApiMessage::SignedUp(Ok(Default::default())));
        assert!(!app.signup_form().is_visible());
        assert!(app.login_form().is_visible());
    }

    #[test]
    fn test_save_request_body_from_form() {
        let (mut app, _) = logged_in_app();
        app.update(key(KeyCode::Char('n')));
        for c in "Ann".chars() {
            app.update(key(KeyCode::Char(c)));
        }
        for _ in 0..3 {
            app.update(key(KeyCode::Tab));
        }
        for c in "a@x.com".chars() {
            app.update(key(KeyCode::Char(c)));
        }

        match app.update(key(KeyCode::Enter)) {
            Some(ApiRequest::SaveContact { id: None, input }) => assert_eq!(
                input,
                ContactInput {
                    first_name: "Ann".to_string(),
                    last_name: None,
                    birthday: None,
                    email: "a@x.com".to_string(),
                    phones: Vec::new(),
                    address: None,
                }
            ),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_drawing_does_not_read_session() {
        let session = Arc::new(CountingSession::default());
        session.save(&TokenPair::new("a", "r")).unwrap();
        let mut app = App::new(session.clone(), true, "local");
        app.startup_command();
        let reads = session.reads.load(Ordering::SeqCst);

        for _ in 0..5 {
            assert!(screen_text(&app).contains("logged in"));
        }
        assert_eq!(session.reads.load(Ordering::SeqCst), reads);
    }

    #[test]
    fn test_header_follows_login_and_logout() {
        let session = Arc::new(MemorySessionStore::new());
        let mut app = App::new(session, true, "local");
        app.startup_command();
        assert!(screen_text(&app).contains("logged out"));

        app.handle_api_message(ApiMessage::LoggedIn(Ok(TokenPair::new("a", "r"))));
        assert!(screen_text(&app).contains("logged in"));

        app.update(key(KeyCode::Char('L')));
        // Login dialog reopens over the list; close it to see the header.
        app.update(key(KeyCode::Esc));
        assert!(screen_text(&app).contains("logged out"));
    }

    #[test]
    fn test_view_renders_header_and_alert() {
        let (mut app, _) = logged_in_app();
        app.handle_api_message(ApiMessage::ContactsListed(Ok(vec![contact(7, "Ann")])));
        app.handle_api_message(ApiMessage::ContactDeleted {
            id: 7,
            result: Err(ApiError::Status {
                status: 500,
                message: "Internal Server Error".to_string(),
            }),
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("LazyContacts"));
        assert!(text.contains("logged in"));
        assert!(text.contains("Internal Server Error"));
    }
}
