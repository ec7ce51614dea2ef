//! Contacts API request and response types.
//!
//! These types model the JSON bodies of the `/api/contacts` and `/api/auth`
//! endpoints, plus the string helpers used to move phone lists and birthdays
//! between form fields and wire values.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Wire format of a birthday.
pub const BIRTHDAY_WIRE_FORMAT: &str = "%Y-%m-%d";

/// Display format of a birthday in the contact table.
pub const BIRTHDAY_DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// A single phone number attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    /// The phone number as typed, no normalization.
    pub phone_num: String,
}

impl Phone {
    /// Create a phone record.
    pub fn new(phone_num: impl Into<String>) -> Self {
        Self {
            phone_num: phone_num.into(),
        }
    }
}

/// A contact record.
///
/// The list, create and update endpoints return a summary shape
/// (`id`, `full_name`, `email`, `birthday`); the single-contact endpoint
/// returns the full shape. Every field except `id` is therefore optional
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Server-assigned identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Display name computed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Date of birth.
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Phone numbers, in server order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phones: Vec<Phone>,
}

impl Contact {
    /// The name shown in the table.
    ///
    /// Prefers the server's `full_name`; otherwise joins first and last name.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|s| !s.is_empty()) {
            return full.to_string();
        }

        match self.last_name.as_deref().filter(|s| !s.is_empty()) {
            Some(last) if !self.first_name.is_empty() => format!("{} {}", self.first_name, last),
            Some(last) => last.to_string(),
            None => self.first_name.clone(),
        }
    }

    /// The birthday as `DD.MM.YYYY`, or an empty string.
    pub fn birthday_display(&self) -> String {
        self.birthday.map(format_birthday).unwrap_or_default()
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    /// First name (required by the server).
    pub first_name: String,
    /// Last name, `null` when blank.
    pub last_name: Option<String>,
    /// Date of birth, `null` when blank.
    pub birthday: Option<NaiveDate>,
    /// Email address (required by the server).
    pub email: String,
    /// Phone numbers.
    pub phones: Vec<Phone>,
    /// Postal address, `null` when blank.
    pub address: Option<String>,
}

/// What the list endpoint should filter on.
///
/// The numeric values are part of the server contract; matching happens
/// server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// No filtering.
    #[default]
    All,
    /// Substring match on first name.
    FirstName,
    /// Substring match on last name.
    LastName,
    /// Substring match on email.
    Email,
    /// Contacts with a birthday in the coming days.
    UpcomingBirthdays,
}

impl FilterType {
    /// All filter types in cycling order.
    pub const ALL: [FilterType; 5] = [
        FilterType::All,
        FilterType::FirstName,
        FilterType::LastName,
        FilterType::Email,
        FilterType::UpcomingBirthdays,
    ];

    /// The `filter_type` query value.
    pub fn code(&self) -> u8 {
        match self {
            FilterType::All => 0,
            FilterType::FirstName => 1,
            FilterType::LastName => 2,
            FilterType::Email => 3,
            FilterType::UpcomingBirthdays => 4,
        }
    }

    /// Short label for the filter bar.
    pub fn label(&self) -> &'static str {
        match self {
            FilterType::All => "All",
            FilterType::FirstName => "First name",
            FilterType::LastName => "Last name",
            FilterType::Email => "Email",
            FilterType::UpcomingBirthdays => "Birthdays",
        }
    }

    /// Whether the filter uses the text field.
    pub fn takes_text(&self) -> bool {
        matches!(
            self,
            FilterType::FirstName | FilterType::LastName | FilterType::Email
        )
    }

    /// The next filter type, wrapping around.
    pub fn next(&self) -> FilterType {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The previous filter type, wrapping around.
    pub fn prev(&self) -> FilterType {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactFilter {
    /// What to filter on.
    pub filter_type: FilterType,
    /// The search text, if any.
    pub filter_str: Option<String>,
}

impl ContactFilter {
    /// A filter that returns every contact.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter, dropping blank text.
    pub fn new(filter_type: FilterType, filter_str: &str) -> Self {
        let text = filter_str.trim();
        Self {
            filter_type,
            filter_str: (filter_type.takes_text() && !text.is_empty()).then(|| text.to_string()),
        }
    }

    /// The query string for the list endpoint, without the leading `?`.
    pub fn query_string(&self) -> String {
        let mut query = format!("filter_type={}", self.filter_type.code());
        if let Some(text) = &self.filter_str {
            query.push_str("&filter_str=");
            query.push_str(&urlencoding::encode(text));
        }
        query
    }
}

/// Body of a signup request.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    /// Optional user name.
    pub username: Option<String>,
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens returned by a successful login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token sent as `Authorization: Bearer ...`.
    pub access_token: String,
    /// Long-lived token. Stored, never used for refreshing.
    pub refresh_token: String,
    /// Token scheme, always "bearer" in practice.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenPair {
    /// Create a bearer token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Acknowledgement body of the auth endpoints that do not return data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    /// Message under `detail`.
    #[serde(default)]
    pub detail: Option<String>,
    /// Message under `message`.
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageResponse {
    /// The message text, whichever key carried it.
    pub fn text(&self) -> Option<&str> {
        self.detail.as_deref().or(self.message.as_deref())
    }
}

/// Join phone numbers with `", "`.
pub fn phones_to_str(phones: &[Phone]) -> String {
    phones
        .iter()
        .map(|p| p.phone_num.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a comma-separated list into phone records.
///
/// Entries are trimmed and empty entries dropped; order is kept.
pub fn str_to_phones(phones: &str) -> Vec<Phone> {
    phones
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Phone::new)
        .collect()
}

/// Format a birthday as `DD.MM.YYYY`.
pub fn format_birthday(date: NaiveDate) -> String {
    date.format(BIRTHDAY_DISPLAY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` form value; blank means no birthday.
pub fn parse_birthday(value: &str) -> Result<Option<NaiveDate>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, BIRTHDAY_WIRE_FORMAT)
        .map(Some)
        .map_err(|_| format!("Birthday '{}' must be in YYYY-MM-DD format", value))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
