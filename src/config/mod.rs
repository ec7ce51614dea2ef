//! Configuration management for LazyContacts.
//!
//! This module handles loading and validating user configuration:
//! backend profiles and application settings, stored as TOML.

mod profile;
mod settings;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::Settings;

/// Environment variable that overrides the configuration file path.
pub const CONFIG_PATH_ENV: &str = "LAZYCONTACTS_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The configuration file could not be read.
    #[error("could not read configuration file: {0}")]
    ReadError(std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value failed validation.
    #[error("{0}")]
    ValidationError(String),

    /// A named profile does not exist.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The complete configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
    /// Configured backends.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            profiles: vec![Profile::local()],
        }
    }
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// A missing file yields the built-in default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load the configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        debug!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// The configuration file path.
    ///
    /// `LAZYCONTACTS_CONFIG` wins over the platform configuration directory.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("lazycontacts").join("config.toml"))
    }

    /// Validate every profile and the profile references in settings.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !seen.contains(default.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "default profile '{}' is not defined",
                    default
                )));
            }
        }

        Ok(())
    }

    /// The default profile: the one named in settings, else the first one.
    pub fn get_default_profile(&self) -> Option<&Profile> {
        self.settings
            .default_profile
            .as_deref()
            .and_then(|name| self.profiles.iter().find(|p| p.name == name))
            .or_else(|| self.profiles.first())
    }

    /// Look up a profile by name.
    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }
}
