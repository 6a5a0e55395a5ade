//! User management screen state
//!
//! Holds a read-only copy of the user collection that is replaced wholesale
//! on every fetch and refetched after every successful mutation. Mutations
//! never touch the local copy directly.

use std::sync::Arc;

use log::{debug, warn};
use portico_model::{UpdateUserStatusRequest, User, UserId};

use crate::domains::auth::errors::{ClientError, ClientResult, ValidationError};
use crate::domains::users::notifications::Notification;
use crate::domains::users::table::{UserRow, user_rows};
use crate::domains::users::validation::CreateUserForm;
use crate::infra::services::user_management::UserAdminService;

const LOAD_FAILED: &str = "Failed to load users";
const CREATE_FAILED: &str = "Failed to create user";
const STATUS_FAILED: &str = "Failed to update user status";

/// Identifies one fetch. Only the newest ticket may write the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Modal create-user dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserDialog {
    pub form: CreateUserForm,
    pub submitting: bool,
    /// Inline field errors from the last submission attempt
    pub errors: Option<ValidationError>,
}

/// What the user is asked before a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub content: String,
    /// Status the account will have once confirmed
    pub target_enabled: bool,
}

impl ConfirmPrompt {
    pub fn for_user(user: &User) -> Self {
        let target_enabled = !user.is_enabled();
        let action = if target_enabled { "Enable" } else { "Disable" };
        Self {
            title: format!("{action} User"),
            content: format!(
                "Are you sure you want to {} {}?",
                action.to_lowercase(),
                user.username
            ),
            target_enabled,
        }
    }
}

pub fn confirm_prompt(user: &User) -> ConfirmPrompt {
    ConfirmPrompt::for_user(user)
}

/// Synchronous confirmation gate
pub trait Confirm {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmPrompt) -> bool,
{
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The user declined; nothing was sent
    Cancelled,
    /// The server accepted the change
    Updated(User),
}

pub struct UsersView {
    service: Arc<dyn UserAdminService>,
    users: Vec<User>,
    loading: bool,
    latest_ticket: u64,
    dialog: Option<CreateUserDialog>,
    notifications: Vec<Notification>,
    timestamp_format: String,
}

impl std::fmt::Debug for UsersView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersView")
            .field("users", &self.users.len())
            .field("loading", &self.loading)
            .field("latest_ticket", &self.latest_ticket)
            .field("dialog_open", &self.dialog.is_some())
            .field("pending_notifications", &self.notifications.len())
            .finish()
    }
}

impl UsersView {
    pub fn new(
        service: Arc<dyn UserAdminService>,
        timestamp_format: impl Into<String>,
    ) -> Self {
        Self {
            service,
            users: Vec::new(),
            loading: false,
            latest_ticket: 0,
            dialog: None,
            notifications: Vec::new(),
            timestamp_format: timestamp_format.into(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn rows(&self) -> Vec<UserRow> {
        user_rows(&self.users, &self.timestamp_format)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn service(&self) -> Arc<dyn UserAdminService> {
        Arc::clone(&self.service)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand pending notifications to the host, oldest first
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Server text when present, `fallback` otherwise
    fn report(&mut self, err: &ClientError, fallback: &str) {
        let message = err.user_message(fallback);
        self.notify_error(err, message);
    }

    fn notify_error(&mut self, err: &ClientError, message: String) {
        // Session loss is handled globally by the HTTP layer
        if err.is_auth() {
            debug!("[Users] Auth failure not surfaced locally: {}", err);
            return;
        }
        warn!("[Users] {}: {}", message, err);
        self.notifications.push(Notification::error(message));
    }

    // ===== Fetch =====

    /// Start a fetch: raise the loading flag and issue the newest ticket
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.loading = true;
        FetchTicket(self.latest_ticket)
    }

    /// Apply a fetch result. Results for superseded tickets are dropped.
    /// Returns whether the result was applied.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: ClientResult<Vec<User>>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            debug!(
                "[Users] Dropping stale fetch {} (latest {})",
                ticket.0, self.latest_ticket
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(users) => {
                debug!("[Users] Loaded {} users", users.len());
                self.users = users;
            }
            Err(e) => self.notify_error(&e, LOAD_FAILED.to_string()),
        }
        true
    }

    /// Reload the full collection
    pub async fn fetch_users(&mut self) {
        let ticket = self.begin_fetch();
        let result = self.service.list_users().await;
        self.apply_fetch(ticket, result);
    }

    // ===== Create =====

    pub fn dialog(&self) -> Option<&CreateUserDialog> {
        self.dialog.as_ref()
    }

    pub fn open_create_dialog(&mut self) {
        self.dialog.get_or_insert_with(CreateUserDialog::default);
    }

    /// Close the dialog, discarding whatever was typed
    pub fn cancel_create_dialog(&mut self) {
        self.dialog = None;
    }

    /// Validate and submit the create form.
    ///
    /// Validation failures stay inline on the dialog and send nothing. Server
    /// failures keep the dialog open and raise a notification. Success closes
    /// the dialog and refetches.
    pub async fn submit_create(&mut self, form: CreateUserForm) -> ClientResult<User> {
        let validated = form.validate();
        let dialog = self.dialog.get_or_insert_with(CreateUserDialog::default);
        dialog.form = form;
        dialog.errors = None;

        let request = match validated {
            Ok(request) => request,
            Err(errors) => {
                dialog.errors = Some(errors.clone());
                return Err(errors.into());
            }
        };
        dialog.submitting = true;

        let result = self.service.create_user(request).await;
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.submitting = false;
        }

        match result {
            Ok(user) => {
                self.dialog = None;
                self.notifications
                    .push(Notification::success("User created successfully"));
                self.fetch_users().await;
                Ok(user)
            }
            Err(e) => {
                self.report(&e, CREATE_FAILED);
                Err(e)
            }
        }
    }

    // ===== Status toggle =====

    /// Ask for confirmation, then flip the account status and refetch.
    ///
    /// The local copy is never flipped ahead of the server.
    pub async fn toggle_status<C>(
        &mut self,
        user: &User,
        confirm: &C,
    ) -> ClientResult<ToggleOutcome>
    where
        C: Confirm + ?Sized,
    {
        let prompt = confirm_prompt(user);
        if !confirm.confirm(&prompt) {
            debug!("[Users] Status change for '{}' cancelled", user.username);
            return Ok(ToggleOutcome::Cancelled);
        }

        let request = UpdateUserStatusRequest {
            enabled: prompt.target_enabled,
        };
        match self.service.update_user_status(user.id, request).await {
            Ok(updated) => {
                let verb = if prompt.target_enabled { "enabled" } else { "disabled" };
                self.notifications
                    .push(Notification::success(format!("User {verb} successfully")));
                self.fetch_users().await;
                Ok(ToggleOutcome::Updated(updated))
            }
            Err(e) => {
                self.report(&e, STATUS_FAILED);
                Err(e)
            }
        }
    }
}
