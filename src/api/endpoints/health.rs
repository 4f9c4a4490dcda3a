//! Health check endpoint.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// `GET /api/health` — unauthenticated liveness check.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running",
        timestamp: Utc::now().to_rfc3339(),
        version: crate::config::APP_VERSION,
    })
}
