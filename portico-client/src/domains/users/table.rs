//! Row model for the user table

use portico_model::{User, UserId};

/// Shown in place of absent values
pub const PLACEHOLDER: &str = "-";

pub const COLUMNS: [&str; 5] = ["Username", "Email", "Status", "Created At", "Actions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagColor {
    Green,
    Red,
}

/// Binary status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTag {
    Enabled,
    Disabled,
}

impl StatusTag {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            StatusTag::Enabled
        } else {
            StatusTag::Disabled
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTag::Enabled => "Enabled",
            StatusTag::Disabled => "Disabled",
        }
    }

    pub fn color(self) -> TagColor {
        match self {
            StatusTag::Enabled => TagColor::Green,
            StatusTag::Disabled => TagColor::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub status: StatusTag,
    pub created_at: String,
    /// Position of the enable/disable switch
    pub switch_on: bool,
}

impl UserRow {
    pub fn from_user(user: &User, timestamp_format: &str) -> Self {
        let enabled = user.is_enabled();
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user
                .email
                .as_deref()
                .filter(|email| !email.is_empty())
                .unwrap_or(PLACEHOLDER)
                .to_string(),
            status: StatusTag::from_enabled(enabled),
            created_at: user
                .created_at
                .map(|ts| ts.format(timestamp_format))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            switch_on: enabled,
        }
    }
}

pub fn user_rows(users: &[User], timestamp_format: &str) -> Vec<UserRow> {
    users
        .iter()
        .map(|user| UserRow::from_user(user, timestamp_format))
        .collect()
}
