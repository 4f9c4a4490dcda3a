//! Shared types for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::models::User;

// ═══════════════════════════════════════════════════════════
// API context — shared state for all routes and middleware
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware: the database
/// connection and the runtime configuration.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }

    /// Lock the connection for one store operation. The guard must never be
    /// held across an await point.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}

// ═══════════════════════════════════════════════════════════
// Current user — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated user context, injected into request extensions by the auth
/// middleware after the token's subject was re-resolved against the store.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

// ═══════════════════════════════════════════════════════════
// Response envelope
// ═══════════════════════════════════════════════════════════

/// The uniform `{success, message?, data?}` wrapper used by every response.
/// Error responses use [`crate::api::error::ErrorBody`], the same shape with
/// `success: false`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope_omits_message() {
        let json = serde_json::to_value(Envelope::data(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn message_only_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::message_only("Done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Done");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn with_message_carries_both() {
        let json =
            serde_json::to_value(Envelope::with_message("Login successful", "tok")).unwrap();
        assert_eq!(json["message"], "Login successful");
        assert_eq!(json["data"], "tok");
    }
}
