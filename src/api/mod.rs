//! Contacts API client and types.
//!
//! This module provides the interface for communicating with the contacts
//! REST API and for storing the session tokens it hands out.

mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ClientOptions, ContactsClient};
pub use error::{ApiError, ErrorKey};
pub use session::{KeyringSessionStore, MemorySessionStore, SessionStore, SharedSession};
pub use types::{Contact, ContactFilter, ContactInput, FilterType, TokenPair};
