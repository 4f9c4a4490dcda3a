//! API error types rendered as the standard response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::DatabaseError;
use crate::lifecycle::LifecycleError;

/// Error body: the envelope with `success: false`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Validation failed")]
    ValidationFailed { errors: Vec<String> },
    #[error("{field} already exists")]
    Duplicate { field: String },
    /// Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::ValidationFailed { errors } => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors.clone()),
            ),
            ApiError::Duplicate { field } => (
                StatusCode::BAD_REQUEST,
                format!("{field} already exists"),
                None,
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
                None,
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                None,
            ),
            ApiError::Forbidden(detail) => (
                StatusCode::FORBIDDEN,
                format!("Access denied: {detail}"),
                None,
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone(), None),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{entity_type} not found"))
            }
            DatabaseError::DuplicateField { field } => ApiError::Duplicate { field },
            DatabaseError::InvalidEnum { field, value } => {
                ApiError::Validation(format!("Invalid value for {field}: {value}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::MalformedToken | AuthError::ExpiredToken | AuthError::BadSignature => {
                ApiError::Unauthorized
            }
            AuthError::MalformedHash => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidTransition { .. } => ApiError::Validation(err.to_string()),
            LifecycleError::NotAssigned => {
                ApiError::Forbidden("appointment is assigned to another doctor".into())
            }
            LifecycleError::RoleNotAllowed(role) => {
                ApiError::Forbidden(format!("{role} may not perform this operation"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn validation_returns_400_envelope() {
        let response = ApiError::Validation("Reason is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Reason is required");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn validation_failed_carries_errors_list() {
        let response = ApiError::ValidationFailed {
            errors: vec!["email must be a valid email address".into()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0], "email must be a valid email address");
    }

    #[tokio::test]
    async fn duplicate_names_the_field() {
        let response = ApiError::Duplicate {
            field: "email".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "email already exists");
    }

    #[tokio::test]
    async fn invalid_credentials_and_unauthorized_are_401() {
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let response = ApiError::Forbidden("doctor role required".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Appointment not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("pragma borked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn database_errors_map_to_taxonomy() {
        let err: ApiError = DatabaseError::DuplicateField {
            field: "username".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Duplicate { .. }));

        let err: ApiError = DatabaseError::NotFound {
            entity_type: "User".into(),
            id: "x".into(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn lifecycle_errors_map_to_taxonomy() {
        let err: ApiError = LifecycleError::NotAssigned.into();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err: ApiError = LifecycleError::InvalidTransition {
            from: "cancelled",
            to: "confirmed",
        }
        .into();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn auth_errors_map_to_taxonomy() {
        let err: ApiError = AuthError::ExpiredToken.into();
        assert!(matches!(err, ApiError::Unauthorized));
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }
}
