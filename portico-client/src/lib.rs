//! Portico client library
//!
//! Session-gated administration client for the Portico user-management API.
//! The `portico` binary in `src/main.rs` is a thin terminal host over these
//! modules.
//!
//! Notes
//! - [`domains`] holds session state, routing and the user management view.
//! - [`infra`] holds the HTTP client, service adapters, config and the token
//!   slot.
//! - [`app::App`] wires both together around one shared session store.

pub mod app;
pub mod cli;
pub mod domains;
pub mod infra;
