//! Bearer token authentication middleware and role guards.
//!
//! `require_auth` extracts `Authorization: Bearer <token>`, verifies the
//! signature and expiry, then re-resolves the subject against the user store
//! so that a deleted user's token is rejected immediately. On success it
//! injects [`CurrentUser`] into request extensions.
//!
//! The role guards run inside `require_auth` in the layer stack and check
//! the injected user's role exactly — there is no role hierarchy.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentUser};
use crate::auth::token;
use crate::db::repository::user;
use crate::models::Role;

/// Require a valid bearer token from a known user.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract bearer token
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // 2. Verify signature + expiry
    let claims = token::verify(&ctx.config.jwt_secret, &bearer)?;

    // 3. Re-resolve the subject against the store. A token for a deleted
    //    user is invalid even before it expires.
    let current = {
        let conn = ctx.db()?;
        user::find_by_id(&conn, &claims.sub)?.ok_or(ApiError::Unauthorized)?
    };

    // 4. Inject user context for downstream handlers and role guards
    req.extensions_mut().insert(CurrentUser(current));

    Ok(next.run(req).await)
}

async fn check_role(
    req: Request<axum::body::Body>,
    next: Next,
    required: Role,
) -> Response {
    let Some(CurrentUser(user)) = req.extensions().get::<CurrentUser>() else {
        return ApiError::Unauthorized.into_response();
    };
    if user.role != required {
        return ApiError::Forbidden(format!("{} role required", required.as_str()))
            .into_response();
    }
    next.run(req).await
}

pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    check_role(req, next, Role::Admin).await
}

pub async fn require_doctor(req: Request<axum::body::Body>, next: Next) -> Response {
    check_role(req, next, Role::Doctor).await
}

pub async fn require_patient(req: Request<axum::body::Body>, next: Next) -> Response {
    check_role(req, next, Role::Patient).await
}
