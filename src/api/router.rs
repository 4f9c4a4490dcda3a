//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/` in four groups: public, any-role,
//! patient-only, doctor-only, and admin-only.
//!
//! Layers are applied from bottom (innermost) to top (outermost):
//!   Extension (outermost) → Auth → Role guard → Handler
//!
//! Extension must be outermost so the auth middleware can access
//! `ApiContext`. Routes with state — `.with_state()` converts
//! `Router<ApiContext>` → `Router<()>` so middleware layers (which use
//! `from_fn` with state = ()) are compatible.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::{ApiContext, Envelope};

/// Build the API router with all route groups and middleware.
pub fn api_router(ctx: ApiContext) -> Router {
    // Unauthenticated routes
    let public = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/check-email", post(endpoints::auth::check_email))
        .route("/auth/verify-username", post(endpoints::auth::verify_username))
        .route("/auth/reset-password", post(endpoints::auth::reset_password))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone());

    // Any authenticated role
    let authenticated = Router::new()
        .route("/auth/profile", get(endpoints::auth::profile))
        .route("/doctors", get(endpoints::doctors::list))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let patient = Router::new()
        .route("/appointments", post(endpoints::appointments::book))
        .route("/appointments/mine", get(endpoints::appointments::mine))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_patient))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let doctor = Router::new()
        .route("/doctors/appointments", get(endpoints::doctors::appointments))
        .route(
            "/doctors/appointments/:id/cancel",
            put(endpoints::doctors::cancel),
        )
        .route(
            "/doctors/appointments/:id/lab-results",
            put(endpoints::doctors::lab_results),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_doctor))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let admin = Router::new()
        .route("/admin/dashboard", get(endpoints::admin::dashboard))
        .route(
            "/admin/users",
            get(endpoints::admin::list_users).post(endpoints::admin::create_user),
        )
        .route("/admin/users/:id", delete(endpoints::admin::delete_user))
        .route("/admin/appointments", get(endpoints::admin::list_appointments))
        .route(
            "/admin/appointments/:id/confirm",
            put(endpoints::admin::confirm),
        )
        .route(
            "/admin/appointments/:id/cancel",
            put(endpoints::admin::cancel),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    // The SPA frontend calls from another origin with bearer tokens.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .nest("/api", public)
        .nest("/api", authenticated)
        .nest("/api", patient)
        .nest("/api", doctor)
        .nest("/api", admin)
        .fallback(route_not_found)
        .layer(cors)
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx))
}

async fn route_not_found() -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope {
            success: false,
            message: Some("Route not found".into()),
            data: None,
        }),
    )
}
