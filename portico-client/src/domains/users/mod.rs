//! Administrative user management: listing, creation and status toggling

pub mod notifications;
pub mod table;
pub mod validation;
pub mod view;

pub use notifications::{Notification, NotificationLevel};
pub use table::{StatusTag, TagColor, UserRow};
pub use validation::CreateUserForm;
pub use view::{
    Confirm, ConfirmPrompt, CreateUserDialog, FetchTicket, ToggleOutcome, UsersView,
    confirm_prompt,
};
