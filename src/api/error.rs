//! API error types for the contacts client.

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alert text shown for any 401 response on contact operations.
pub const NOT_AUTHENTICATED_TEXT: &str = "Not authenticated";

/// Alert text shown for any 422 response, whatever the server says.
pub const INVALID_INPUT_TEXT: &str = "Input data is invalid";

/// Which JSON field of an error body carries the human-readable message.
///
/// The token-aware backend answers with `{"detail": ...}`, the older one
/// with `{"message": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKey {
    /// Read the `detail` field.
    #[default]
    Detail,
    /// Read the `message` field.
    Message,
}

impl ErrorKey {
    /// The JSON field name.
    pub fn field(&self) -> &'static str {
        match self {
            ErrorKey::Detail => "detail",
            ErrorKey::Message => "message",
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for ErrorKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detail" => Ok(ErrorKey::Detail),
            "message" => Ok(ErrorKey::Message),
            other => Err(format!(
                "unknown error key '{}': expected 'detail' or 'message'",
                other
            )),
        }
    }
}

/// Errors that can occur when talking to the contacts API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 - missing, expired or rejected credentials.
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    /// 422 - the server rejected the submitted fields.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 404 - the contact (or route) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409 - e.g. the account already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// The numeric status code.
        status: u16,
        /// The server-provided message, or the status text.
        message: String,
    },

    /// Transport failure (connection refused, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The configured base URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Reading or writing the session store failed.
    #[error("Session store error: {0}")]
    Session(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Classify a non-success response.
    ///
    /// The message is taken from `error_key` in the JSON body; when the body
    /// is empty, not JSON, or lacks the field, the status text is used.
    pub fn from_response(status: StatusCode, body: &str, error_key: ErrorKey) -> Self {
        let message = extract_message(body, error_key).unwrap_or_else(|| status_text(status));

        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::Validation(message),
            code => ApiError::Status {
                status: code,
                message,
            },
        }
    }

    /// The text to put in the alert dialog for a failed action.
    pub fn alert_text(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => NOT_AUTHENTICATED_TEXT.to_string(),
            ApiError::Validation(_) => INVALID_INPUT_TEXT.to_string(),
            ApiError::NotFound(msg) | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Network(e) => format!("Connection failed: {}", e),
            ApiError::InvalidResponse(msg) => format!("Unexpected response from server: {}", msg),
            ApiError::InvalidUrl(msg) => format!("Invalid server URL: {}", msg),
            ApiError::Session(msg) => format!("Could not access session storage: {}", msg),
        }
    }
}

/// Pull the message field out of an error body.
///
/// FastAPI validation errors put an array of objects under `detail`;
/// non-string values are rendered as compact JSON.
fn extract_message(body: &str, error_key: ErrorKey) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    match json.get(error_key.field())? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_401_keeps_detail() {
        let err = ApiError::from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Invalid email"}"#,
            ErrorKey::Detail,
        );
        match err {
            ApiError::Unauthorized(ref msg) => assert_eq!(msg, "Invalid email"),
            _ => panic!("Expected Unauthorized error"),
        }
        assert_eq!(err.alert_text(), "Not authenticated");
    }

    #[test]
    fn test_from_response_422_always_generic_alert() {
        let bodies = [
            r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"}]}"#,
            r#"{"detail":"something specific"}"#,
            "",
            "not json at all",
        ];
        for body in bodies {
            let err =
                ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, body, ErrorKey::Detail);
            assert!(matches!(err, ApiError::Validation(_)));
            assert_eq!(err.alert_text(), "Input data is invalid");
        }
    }

    #[test]
    fn test_from_response_other_status_echoes_detail() {
        let err = ApiError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Contact by id 7 not found"}"#,
            ErrorKey::Detail,
        );
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.alert_text(), "Contact by id 7 not found");

        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"duplicate key value"}"#,
            ErrorKey::Detail,
        );
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert_eq!(err.alert_text(), "duplicate key value");
    }

    #[test]
    fn test_from_response_legacy_message_key() {
        let body = r#"{"message":"Contact not found","detail":"ignored"}"#;
        let err = ApiError::from_response(StatusCode::NOT_FOUND, body, ErrorKey::Message);
        assert_eq!(err.alert_text(), "Contact not found");
    }

    #[test]
    fn test_from_response_missing_key_falls_back_to_status_text() {
        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"boom"}"#,
            ErrorKey::Detail,
        );
        assert_eq!(err.alert_text(), "Internal Server Error");
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[test]
    fn test_from_response_409_conflict() {
        let err = ApiError::from_response(
            StatusCode::CONFLICT,
            r#"{"detail":"Account already exists"}"#,
            ErrorKey::Detail,
        );
        match err {
            ApiError::Conflict(ref msg) => assert_eq!(msg, "Account already exists"),
            _ => panic!("Expected Conflict error"),
        }
        assert_eq!(err.alert_text(), "Account already exists");
    }

    #[test]
    fn test_error_key_parse() {
        assert_eq!("detail".parse::<ErrorKey>().unwrap(), ErrorKey::Detail);
        assert_eq!("MESSAGE".parse::<ErrorKey>().unwrap(), ErrorKey::Message);
        assert!("msg".parse::<ErrorKey>().is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }
}
