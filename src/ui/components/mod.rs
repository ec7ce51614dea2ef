//! Reusable UI components.

mod input;
mod modal;
mod notification;
mod table;

pub use input::TextInput;
pub use modal::{centered_rect, AlertDialog, ConfirmAction, ConfirmDialog};
pub use notification::NotificationManager;
pub use table::{ContactTable, RowAction};
