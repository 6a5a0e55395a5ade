//! Client error types
//!
//! Every fallible operation in the client resolves to [`ClientError`], which
//! splits failures the way the UI has to treat them: authentication problems
//! are handled globally, validation problems inline, and network/server
//! problems as transient notifications.

use thiserror::Error;

/// Main client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad credentials or an invalidated session
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Client-side field checks failed before anything was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The call failed without an interpretable response
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The API answered with an error payload
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Persisted token slot could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    /// Message suitable for a user-facing notification.
    ///
    /// Server-provided text wins; everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Server(ServerError {
                message: Some(message),
                ..
            }) => message.clone(),
            ClientError::Validation(errors) => errors.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Authentication-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Session expired - please login again")]
    SessionExpired,

    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Network-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Request timed out")]
    Timeout,

    #[error("Server unreachable: {0}")]
    Unreachable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::Unreachable(err.to_string())
        } else if err.is_decode() {
            NetworkError::InvalidResponse(err.to_string())
        } else {
            NetworkError::RequestFailed(err.to_string())
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.into())
    }
}

/// Interpretable error payload from the API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "request failed with status {status}{}",
    .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
)]
pub struct ServerError {
    pub status: u16,
    pub message: Option<String>,
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unable to determine data directory")]
    NoDataDir,

    #[error("Failed to read from storage")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write to storage")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to remove stored value")]
    RemoveFailed(#[source] std::io::Error),
}

/// A single failed field check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Please enter username")]
    UsernameRequired,

    #[error("Please enter password")]
    PasswordRequired,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Please enter a valid email")]
    InvalidEmail,
}

/// Which form field a check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Password,
    Email,
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::UsernameRequired => Field::Username,
            FieldError::PasswordRequired | FieldError::PasswordTooShort { .. } => {
                Field::Password
            }
            FieldError::InvalidEmail => Field::Email,
        }
    }
}

/// All field failures of one submission, in form order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{}",
    .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field() == field)
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
