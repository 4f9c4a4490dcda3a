//! Request middleware: bearer-token authentication and role guards.

pub mod auth;
