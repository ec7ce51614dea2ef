//! Application views (screens and dialogs).

mod auth_form;
mod contact_form;
mod list;

pub use auth_form::{LoginAction, LoginFormView, SignupAction, SignupFormView};
pub use contact_form::{ContactFormAction, ContactFormView};
#[cfg(test)]
pub use contact_form::ContactField;
pub use list::{ContactListView, ListAction};
