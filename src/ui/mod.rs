//! User interface components and views.
//!
//! This module contains all TUI rendering logic: the contact list screen,
//! the dialogs layered over it and the reusable components they share.

pub mod components;
pub mod theme;
pub mod views;

pub use components::{AlertDialog, ConfirmAction, ConfirmDialog, NotificationManager};
pub use views::{
    ContactFormAction, ContactFormView, ContactListView, ListAction, LoginAction, LoginFormView,
    SignupAction, SignupFormView,
};
