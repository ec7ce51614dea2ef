//! Contacts API client implementation.
//!
//! This module provides the client for the contacts REST API. It handles
//! bearer authentication, request/response processing and error mapping.
//! Every operation issues exactly one HTTP request; nothing is retried.
//!
//! Request construction is split from execution: each operation has a
//! `*_request` builder returning a [`reqwest::Request`], which keeps URL,
//! header and body logic testable without a server.

use std::time::Duration;

use reqwest::{header, Client, Method, Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::error::{ApiError, ErrorKey, Result};
use super::session::SharedSession;
use super::types::{
    Contact, ContactFilter, ContactInput, MessageResponse, SignupRequest, TokenPair,
};
use crate::config::Profile;

/// How the client talks to the backend.
///
/// The token-aware backend requires a bearer token on every contact route
/// and reports errors under `detail`; the older backend has no auth and
/// reports errors under `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Attach `Authorization: Bearer <token>` to contact requests.
    pub auth_enabled: bool,
    /// Which JSON field carries error messages.
    pub error_key: ErrorKey,
}

impl ClientOptions {
    /// Options for the older backend without authentication.
    pub fn legacy() -> Self {
        Self {
            auth_enabled: false,
            error_key: ErrorKey::Message,
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auth_enabled: true,
            error_key: ErrorKey::Detail,
        }
    }
}

/// The contacts API client.
#[derive(Debug, Clone)]
pub struct ContactsClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the backend, without a trailing slash.
    base_url: String,
    /// Backend flavour.
    options: ClientOptions,
    /// Where the access token is read from on each call.
    session: SharedSession,
}

impl ContactsClient {
    /// Create a client for a configured profile.
    ///
    /// `timeout` is applied to every request when set; otherwise the
    /// transport defaults apply.
    #[instrument(skip(profile, session), fields(profile_name = %profile.name))]
    pub fn new(
        profile: &Profile,
        session: SharedSession,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        info!("Creating contacts client for profile");

        let client = Self::build_http_client(timeout)?;
        let base_url = normalize_base_url(&profile.url)?;

        Ok(Self {
            client,
            base_url,
            options: profile.client_options(),
            session,
        })
    }

    /// Create a client with explicit settings and no proxy.
    #[cfg(test)]
    pub fn with_options(
        base_url: &str,
        options: ClientOptions,
        session: SharedSession,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().no_proxy().build()?,
            base_url: normalize_base_url(base_url)?,
            options,
            session,
        })
    }

    /// Build the HTTP client.
    fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(ApiError::Network)
    }

    // ========================================================================
    // Request builders
    // ========================================================================

    /// `POST /api/auth/signup/` with a JSON body.
    pub fn signup_request(&self, body: &SignupRequest) -> Result<Request> {
        Ok(self
            .request(Method::POST, "/api/auth/signup/")
            .json(body)
            .build()?)
    }

    /// `POST /api/auth/login/` with a form-encoded body and no Authorization header.
    pub fn login_request(&self, email: &str, password: &str) -> Result<Request> {
        Ok(self
            .request(Method::POST, "/api/auth/login/")
            .form(&[("username", email), ("password", password)])
            .build()?)
    }

    /// `POST /api/auth/request_email` asking for a new confirmation email.
    pub fn request_email_request(&self, email: &str) -> Result<Request> {
        Ok(self
            .request(Method::POST, "/api/auth/request_email")
            .json(&serde_json::json!({ "email": email }))
            .build()?)
    }

    /// `POST /api/auth/forgot_password` asking for a password reset email.
    pub fn forgot_password_request(&self, email: &str) -> Result<Request> {
        Ok(self
            .request(Method::POST, "/api/auth/forgot_password")
            .json(&serde_json::json!({ "email": email }))
            .build()?)
    }

    /// List request; the token-aware backend takes filter parameters.
    pub fn list_request(&self, filter: &ContactFilter) -> Result<Request> {
        let path = if self.options.auth_enabled {
            format!("/api/contacts/?{}", filter.query_string())
        } else {
            "/api/contacts".to_string()
        };
        Ok(self.authorize(self.request(Method::GET, &path))?.build()?)
    }

    /// `GET /api/contacts/{id}`.
    pub fn get_request(&self, id: i64) -> Result<Request> {
        let path = format!("/api/contacts/{}", id);
        Ok(self.authorize(self.request(Method::GET, &path))?.build()?)
    }

    /// `POST` a new contact when `id` is `None`, otherwise `PUT /api/contacts/{id}`.
    pub fn upsert_request(&self, id: Option<i64>, input: &ContactInput) -> Result<Request> {
        let builder = match id {
            None if self.options.auth_enabled => self.request(Method::POST, "/api/contacts/"),
            None => self.request(Method::POST, "/api/contacts"),
            Some(id) => self.request(Method::PUT, &format!("/api/contacts/{}", id)),
        };
        Ok(self.authorize(builder.json(input))?.build()?)
    }

    /// `DELETE /api/contacts/{id}`.
    pub fn delete_request(&self, id: i64) -> Result<Request> {
        let path = format!("/api/contacts/{}", id);
        Ok(self.authorize(self.request(Method::DELETE, &path))?.build()?)
    }

    /// Start a request against a path below the base URL.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json")
    }

    /// Attach the bearer token, read fresh from the session store.
    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        if !self.options.auth_enabled {
            return Ok(builder);
        }

        let token = self.session.access_token().ok_or_else(|| {
            debug!("No access token stored, refusing authenticated request");
            ApiError::Unauthorized("no access token stored".to_string())
        })?;

        Ok(builder.header(header::AUTHORIZATION, format!("Bearer {}", token)))
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Register a new account.
    #[instrument(skip(self, body), fields(email = %body.email))]
    pub async fn signup(&self, body: &SignupRequest) -> Result<MessageResponse> {
        let request = self.signup_request(body)?;
        let response: MessageResponse = self.execute(request).await?;
        info!("Signup accepted");
        Ok(response)
    }

    /// Exchange credentials for a token pair.
    ///
    /// Does not touch the session store; the caller saves the tokens.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let request = self.login_request(email, password)?;
        let response = self.client.execute(request).await?;
        info!(status = %response.status(), "Login response");
        self.handle_response(response).await
    }

    /// Ask the backend to resend the confirmation email.
    #[instrument(skip(self))]
    pub async fn request_email(&self, email: &str) -> Result<MessageResponse> {
        let request = self.request_email_request(email)?;
        self.execute(request).await
    }

    /// Ask the backend to send a password reset email.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let request = self.forgot_password_request(email)?;
        self.execute(request).await
    }

    /// List contacts, in server order.
    #[instrument(skip(self), fields(filter_type = filter.filter_type.code()))]
    pub async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let request = self.list_request(filter)?;
        let contacts: Vec<Contact> = self.execute(request).await?;
        debug!("Fetched {} contacts", contacts.len());
        Ok(contacts)
    }

    /// Fetch a single contact with all its fields.
    #[instrument(skip(self))]
    pub async fn get_contact(&self, id: i64) -> Result<Contact> {
        let request = self.get_request(id)?;
        self.execute(request).await
    }

    /// Create (`id` = `None`) or update a contact.
    #[instrument(skip(self, input))]
    pub async fn upsert_contact(&self, id: Option<i64>, input: &ContactInput) -> Result<Contact> {
        let request = self.upsert_request(id, input)?;
        let contact: Contact = self.execute(request).await?;
        debug!(contact_id = contact.id, "Contact saved");
        Ok(contact)
    }

    /// Delete a contact. Any 2xx response counts as success.
    #[instrument(skip(self))]
    pub async fn delete_contact(&self, id: i64) -> Result<()> {
        let request = self.delete_request(id)?;
        let response = self.client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            debug!(%status, "Contact deleted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(self.error_from_response(status, &body))
        }
    }

    /// Send a request and decode a JSON success body.
    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.client.execute(request).await?;
        self.handle_response(response).await
    }

    /// Check the status and parse JSON, or turn the body into an error.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);
            Err(self.error_from_response(status, &error_body))
        }
    }

    fn error_from_response(&self, status: reqwest::StatusCode, body: &str) -> ApiError {
        let error = ApiError::from_response(status, body, self.options.error_key);
        warn!(%status, error = %error, "Request failed");
        error
    }
}

/// Normalize the base URL by removing trailing slashes.
///
/// Rejects URLs without an http(s) scheme and warns about plain HTTP to
/// anything other than localhost.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ApiError::InvalidUrl(format!(
            "'{}' must start with http:// or https://",
            url
        )));
    }

    if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. Tokens will travel in clear text.", url);
    }

    Ok(url.to_string())
}
