//! Application settings configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// The name of the default profile to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Per-request timeout. Unset means the transport defaults apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// The request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_timeout() {
        assert_eq!(Settings::default().request_timeout(), None);
    }

    #[test]
    fn test_request_timeout() {
        let settings = Settings {
            default_profile: None,
            request_timeout_secs: Some(30),
        };
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
    }
}
