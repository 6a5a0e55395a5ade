//! Typed service contracts over the admin API
//!
//! Each trait is the seam the domains depend on; the `*ApiAdapter` types are
//! the production implementations backed by [`ApiClient`](crate::infra::api_client::ApiClient).

pub mod auth;
pub mod user_management;

pub use auth::{AuthApiAdapter, AuthService};
pub use user_management::{UserAdminApiAdapter, UserAdminService};
