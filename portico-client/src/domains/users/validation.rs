//! Client-side checks for the create-user form
//!
//! The rules match what the server enforces, so a form that passes here is
//! only rejected remotely for state-dependent reasons (duplicate username).

use std::sync::LazyLock;

use portico_model::CreateUserRequest;
use regex::Regex;

use crate::domains::auth::errors::{FieldError, ValidationError};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Raw field values as typed by the user
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CreateUserForm {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for CreateUserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

impl CreateUserForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: Option<&str>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.unwrap_or_default().to_string(),
        }
    }

    /// Check every field and build the request body.
    ///
    /// All failing fields are reported together, in form order.
    pub fn validate(&self) -> Result<CreateUserRequest, ValidationError> {
        let mut errors = Vec::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.push(FieldError::UsernameRequired);
        }

        if self.password.is_empty() {
            errors.push(FieldError::PasswordRequired);
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        let email = self.email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(FieldError::InvalidEmail);
        }

        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }

        Ok(CreateUserRequest {
            username: username.to_string(),
            password: self.password.clone(),
            email: (!email.is_empty()).then(|| email.to_string()),
        })
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
