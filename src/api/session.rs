//! Session token storage.
//!
//! After a successful login the access and refresh tokens are saved to a
//! [`SessionStore`]. The API client reads the access token from the store
//! on every authenticated call, so a login or logout takes effect on the
//! next request without rebuilding the client.
//!
//! Two stores are provided: an in-memory one for tests and throwaway runs,
//! and one backed by the OS keyring.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::error::{ApiError, Result};
use super::types::TokenPair;

/// The keyring service name for LazyContacts tokens.
const KEYRING_SERVICE: &str = "lazycontacts";

/// Storage for the tokens of the logged-in user.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Persist both tokens, replacing any previous session.
    fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// The current access token, if logged in.
    fn access_token(&self) -> Option<String>;

    /// The current refresh token, if logged in. Stored for completeness;
    /// nothing refreshes tokens yet.
    #[cfg(test)]
    fn refresh_token(&self) -> Option<String>;

    /// Forget the session.
    fn clear(&self) -> Result<()>;

    /// Whether an access token is stored.
    fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }
}

/// Shared handle to a session store.
pub type SharedSession = Arc<dyn SessionStore>;

/// A session store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a session.
    #[cfg(test)]
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        let store = Self::new();
        // Writing to a fresh mutex cannot fail.
        let _ = store.save(tokens);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        let mut stored = self
            .tokens
            .lock()
            .map_err(|_| ApiError::Session("session lock poisoned".to_string()))?;
        *stored = Some(tokens.clone());
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .ok()
            .and_then(|t| t.as_ref().map(|t| t.access_token.clone()))
    }

    #[cfg(test)]
    fn refresh_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .ok()
            .and_then(|t| t.as_ref().map(|t| t.refresh_token.clone()))
    }

    fn clear(&self) -> Result<()> {
        let mut stored = self
            .tokens
            .lock()
            .map_err(|_| ApiError::Session("session lock poisoned".to_string()))?;
        *stored = None;
        Ok(())
    }
}

impl fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

/// A session store backed by the OS keyring.
///
/// Each profile gets two entries, `<profile>:access` and `<profile>:refresh`,
/// under the `lazycontacts` service.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    profile: String,
}

impl KeyringSessionStore {
    /// Create a store for the given profile.
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    /// The keyring user name for one of the tokens.
    fn entry_name(&self, kind: &str) -> String {
        format!("{}:{}", self.profile, kind)
    }

    fn entry(&self, kind: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &self.entry_name(kind))
            .map_err(|e| ApiError::Session(format!("failed to access keyring: {}", e)))
    }

    fn read(&self, kind: &str) -> Option<String> {
        match self.entry(kind).and_then(|entry| {
            entry
                .get_password()
                .map_err(|e| ApiError::Session(e.to_string()))
        }) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!(profile = %self.profile, kind, error = %e, "No token in keyring");
                None
            }
        }
    }

    fn delete(&self, kind: &str) -> Result<()> {
        match self.entry(kind)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ApiError::Session(format!("failed to delete token: {}", e))),
        }
    }
}

impl SessionStore for KeyringSessionStore {
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        self.entry("access")?
            .set_password(&tokens.access_token)
            .map_err(|e| ApiError::Session(format!("failed to store access token: {}", e)))?;
        self.entry("refresh")?
            .set_password(&tokens.refresh_token)
            .map_err(|e| ApiError::Session(format!("failed to store refresh token: {}", e)))?;
        debug!(profile = %self.profile, "Session saved to keyring");
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        self.read("access")
    }

    #[cfg(test)]
    fn refresh_token(&self) -> Option<String> {
        self.read("refresh")
    }

    fn clear(&self) -> Result<()> {
        self.delete("access")?;
        self.delete("refresh")?;
        debug!(profile = %self.profile, "Session cleared from keyring");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemorySessionStore::new();
        assert!(!store.is_logged_in());
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
    }

    #[test]
    fn test_memory_store_save_and_clear() {
        let store = MemorySessionStore::new();
        store.save(&TokenPair::new("access-1", "refresh-1")).unwrap();

        assert!(store.is_logged_in());
        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));

        store.save(&TokenPair::new("access-2", "refresh-2")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("access-2"));

        store.clear().unwrap();
        assert!(!store.is_logged_in());
        assert_eq!(store.refresh_token(), None);
    }

    #[test]
    fn test_memory_store_debug_hides_tokens() {
        let store = MemorySessionStore::with_tokens(&TokenPair::new("secret", "secret2"));
        let debug = format!("{:?}", store);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("logged_in: true"));
    }

    #[test]
    fn test_keyring_entry_names_are_per_profile() {
        let store = KeyringSessionStore::new("work");
        assert_eq!(store.entry_name("access"), "work:access");
        assert_eq!(store.entry_name("refresh"), "work:refresh");
    }
}
