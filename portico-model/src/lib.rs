//! Wire models shared between the Portico client and the admin API.
//!
//! Everything in this crate mirrors the JSON the server speaks: field names
//! are camelCase on the wire and optional fields are omitted when absent.
#![allow(missing_docs)]

pub mod auth;
pub mod routes;
pub mod timestamp;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, LoginResponse};
pub use timestamp::Timestamp;
pub use user::{CreateUserRequest, UpdateUserStatusRequest, User, UserId};
