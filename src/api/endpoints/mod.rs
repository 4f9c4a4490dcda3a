//! API endpoint handlers, one module per route group.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod health;
