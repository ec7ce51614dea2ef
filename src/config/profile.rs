//! Backend profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::{ClientOptions, ErrorKey};

/// A backend profile.
///
/// Profiles store where the contacts API lives and which flavour of it
/// is running there. Session tokens are stored separately, per profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The backend base URL (e.g., "http://localhost:8000").
    pub url: String,

    /// Whether the backend requires a bearer token on contact routes.
    #[serde(default = "default_true")]
    pub auth_enabled: bool,

    /// Which JSON field carries error messages.
    #[serde(default)]
    pub error_key: ErrorKey,
}

fn default_true() -> bool {
    true
}

impl Profile {
    /// Create a new token-aware profile.
    pub fn new(name: String, url: String) -> Self {
        Self {
            name,
            url,
            auth_enabled: true,
            error_key: ErrorKey::Detail,
        }
    }

    /// The built-in profile for a backend on this machine.
    pub fn local() -> Self {
        Self::new("local".to_string(), "http://localhost:8000".to_string())
    }

    /// The client options this profile selects.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            auth_enabled: self.auth_enabled,
            error_key: self.error_key,
        }
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The name is non-empty and has no whitespace
    /// - The URL is non-empty and starts with http:// or https://
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profile() {
        assert!(Profile::local().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let profile = Profile::new("".to_string(), "http://localhost:8000".to_string());
        let result = profile.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let profile = Profile::new("my box".to_string(), "http://localhost:8000".to_string());
        assert!(profile
            .validate()
            .unwrap_err()
            .to_string()
            .contains("cannot contain whitespace"));
    }

    #[test]
    fn test_empty_url_rejected() {
        let profile = Profile::new("local".to_string(), "".to_string());
        assert!(profile
            .validate()
            .unwrap_err()
            .to_string()
            .contains("URL cannot be empty"));
    }

    #[test]
    fn test_invalid_url_scheme_rejected() {
        let profile = Profile::new("local".to_string(), "localhost:8000".to_string());
        assert!(profile
            .validate()
            .unwrap_err()
            .to_string()
            .contains("must start with http"));
    }

    #[test]
    fn test_client_options_follow_profile() {
        let mut profile = Profile::local();
        assert_eq!(profile.client_options(), ClientOptions::default());

        profile.auth_enabled = false;
        profile.error_key = ErrorKey::Message;
        assert_eq!(profile.client_options(), ClientOptions::legacy());
    }

    #[test]
    fn test_profile_defaults_when_fields_omitted() {
        let profile: Profile = toml::from_str("name = \"x\"\nurl = \"http://h\"").unwrap();
        assert!(profile.auth_enabled);
        assert_eq!(profile.error_key, ErrorKey::Detail);
    }

    #[test]
    fn test_profile_serialization() {
        let profile = Profile::local();
        let toml_str = toml::to_string(&profile).unwrap();
        let parsed: Profile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, profile);
    }
}
