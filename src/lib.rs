//! Clinica — clinic appointment management API.
//!
//! Patients book appointments with doctors, doctors manage cancellations and
//! lab results, admins approve appointments and manage accounts. Everything
//! is served as JSON over HTTP under `/api/`.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod models;
