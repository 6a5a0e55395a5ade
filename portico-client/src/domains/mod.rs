pub mod auth;
pub mod ui;
pub mod users;
