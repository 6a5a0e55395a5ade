//! Authentication domain
//!
//! Session state, the shared handle that mutates it, the lifecycle manager
//! and the 401 invalidation hook handed to the HTTP layer.

pub mod errors;
pub mod invalidation;
pub mod manager;
pub mod session;
pub mod state_types;

pub use errors::*;
pub use invalidation::SessionInvalidator;
pub use manager::SessionManager;
pub use session::SessionHandle;
pub use state_types::{SessionState, SessionStore};
