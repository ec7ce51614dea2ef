//! Async task management for non-blocking API operations.
//!
//! The UI never awaits a request inline. The app returns an [`ApiRequest`]
//! describing what it wants, the main loop hands it to [`TaskSpawner`], and
//! the spawned tokio task sends an [`ApiMessage`] back through an unbounded
//! channel. The main loop drains the channel with `try_recv()` between
//! frames and feeds each message to the app.
//!
//! Requests are not cancelled. If two saves race, their results are applied
//! in arrival order.

use std::fmt;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{MessageResponse, SignupRequest};
use crate::api::{ApiError, Contact, ContactFilter, ContactInput, ContactsClient, TokenPair};

/// Work the app asks the main loop to run in the background.
///
/// `Debug` output never contains a password, so requests can be logged.
#[derive(Clone)]
pub enum ApiRequest {
    /// Load the table.
    ListContacts(ContactFilter),
    /// Fetch one contact for the edit dialog.
    FetchContact(i64),
    /// Create (`id` = `None`) or update a contact.
    SaveContact {
        id: Option<i64>,
        input: ContactInput,
    },
    /// Delete a contact.
    DeleteContact(i64),
    /// Exchange credentials for tokens.
    Login { email: String, password: String },
    /// Register an account.
    Signup(SignupRequest),
    /// Resend the confirmation email.
    RequestEmail(String),
    /// Send a password reset email.
    ForgotPassword(String),
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiRequest::ListContacts(filter) => {
                f.debug_tuple("ListContacts").field(filter).finish()
            }
            ApiRequest::FetchContact(id) => f.debug_tuple("FetchContact").field(id).finish(),
            ApiRequest::SaveContact { id, input } => f
                .debug_struct("SaveContact")
                .field("id", id)
                .field("input", input)
                .finish(),
            ApiRequest::DeleteContact(id) => f.debug_tuple("DeleteContact").field(id).finish(),
            ApiRequest::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            ApiRequest::Signup(body) => f.debug_tuple("Signup").field(body).finish(),
            ApiRequest::RequestEmail(email) => f.debug_tuple("RequestEmail").field(email).finish(),
            ApiRequest::ForgotPassword(email) => {
                f.debug_tuple("ForgotPassword").field(email).finish()
            }
        }
    }
}

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// Result of a list request.
    ContactsListed(Result<Vec<Contact>, ApiError>),

    /// Result of fetching one contact.
    ContactFetched {
        id: i64,
        result: Result<Contact, ApiError>,
    },

    /// Result of a save. `id` echoes the request, `None` for a create.
    ContactSaved {
        id: Option<i64>,
        result: Result<Contact, ApiError>,
    },

    /// Result of a delete, keyed by the requested id.
    ContactDeleted {
        id: i64,
        result: Result<(), ApiError>,
    },

    /// Result of a login.
    LoggedIn(Result<TokenPair, ApiError>),

    /// Result of a signup.
    SignedUp(Result<MessageResponse, ApiError>),

    /// Result of a resend-confirmation or password-reset request.
    EmailRequested(Result<MessageResponse, ApiError>),
}

/// Spawns background tasks for API operations.
///
/// Each method clones the client and sender into a tokio task that sends
/// its result through the channel. A closed receiver means the app is
/// shutting down, so send errors are ignored.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
    client: ContactsClient,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>, client: ContactsClient) -> Self {
        Self { tx, client }
    }

    /// Spawn the task for a request.
    pub fn dispatch(&self, request: ApiRequest) {
        debug!(?request, "Dispatching API request");
        match request {
            ApiRequest::ListContacts(filter) => self.spawn_list_contacts(filter),
            ApiRequest::FetchContact(id) => self.spawn_fetch_contact(id),
            ApiRequest::SaveContact { id, input } => self.spawn_save_contact(id, input),
            ApiRequest::DeleteContact(id) => self.spawn_delete_contact(id),
            ApiRequest::Login { email, password } => self.spawn_login(email, password),
            ApiRequest::Signup(body) => self.spawn_signup(body),
            ApiRequest::RequestEmail(email) => self.spawn_request_email(email),
            ApiRequest::ForgotPassword(email) => self.spawn_forgot_password(email),
        }
    }

    /// Spawn a task to list contacts.
    pub fn spawn_list_contacts(&self, filter: ContactFilter) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.list_contacts(&filter).await;
            let _ = tx.send(ApiMessage::ContactsListed(result));
        });
    }

    /// Spawn a task to fetch one contact.
    pub fn spawn_fetch_contact(&self, id: i64) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.get_contact(id).await;
            let _ = tx.send(ApiMessage::ContactFetched { id, result });
        });
    }

    /// Spawn a task to create or update a contact.
    pub fn spawn_save_contact(&self, id: Option<i64>, input: ContactInput) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.upsert_contact(id, &input).await;
            let _ = tx.send(ApiMessage::ContactSaved { id, result });
        });
    }

    /// Spawn a task to delete a contact.
    pub fn spawn_delete_contact(&self, id: i64) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.delete_contact(id).await;
            let _ = tx.send(ApiMessage::ContactDeleted { id, result });
        });
    }

    /// Spawn a task to log in.
    pub fn spawn_login(&self, email: String, password: String) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.login(&email, &password).await;
            let _ = tx.send(ApiMessage::LoggedIn(result));
        });
    }

    /// Spawn a task to sign up.
    pub fn spawn_signup(&self, body: SignupRequest) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.signup(&body).await;
            let _ = tx.send(ApiMessage::SignedUp(result));
        });
    }

    /// Spawn a task to resend the confirmation email.
    pub fn spawn_request_email(&self, email: String) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.request_email(&email).await;
            let _ = tx.send(ApiMessage::EmailRequested(result));
        });
    }

    /// Spawn a task to send a password reset email.
    pub fn spawn_forgot_password(&self, email: String) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.forgot_password(&email).await;
            let _ = tx.send(ApiMessage::EmailRequested(result));
        });
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel(
    client: ContactsClient,
) -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx, client))
}
