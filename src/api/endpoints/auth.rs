//! Authentication endpoints: registration, login, password reset, profile.
//!
//! The three password-reset steps are deliberately stateless and unbound —
//! each queries the store independently, faithful to the system this
//! replaces (see DESIGN.md for why this is not silently "fixed").

use std::str::FromStr;
use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentUser, Envelope};
use crate::auth::{password, token};
use crate::db::repository::user;
use crate::models::{Role, User};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Pull a required field out of an optional payload slot.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{name} is required"))),
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed {
            errors: vec!["email must be a valid email address".into()],
        })
    }
}

/// User plus fresh token, returned by register and login.
#[derive(Serialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Serialize)]
pub struct ProfilePayload {
    pub user: User,
}

// ═══════════════════════════════════════════════════════════
// POST /api/auth/register
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Register a new account. Role defaults to patient. The fresh token logs
/// the user straight in.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<AuthPayload>>), ApiError> {
    let username = required(&request.username, "username")?;
    let email = required(&request.email, "email")?;
    let plaintext = required(&request.password, "password")?;
    validate_email(email)?;

    let role = match request.role.as_deref() {
        None | Some("") => Role::Patient,
        Some(r) => Role::from_str(r)
            .map_err(|_| ApiError::Validation(format!("Invalid role: {r}")))?,
    };

    let now = Utc::now();
    let new_user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(plaintext),
        role,
        created_at: now,
        updated_at: now,
    };

    {
        let conn = ctx.db()?;
        user::insert_user(&conn, &new_user)?;
    }

    let token = token::issue(&ctx.config.jwt_secret, &new_user, ctx.config.token_ttl_days)?;
    tracing::info!(username, role = role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "User registered successfully",
            AuthPayload {
                user: new_user,
                token,
            },
        )),
    ))
}

// ═══════════════════════════════════════════════════════════
// POST /api/auth/login
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login. Unknown email and wrong password fail identically so the endpoint
/// cannot be used to enumerate accounts.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthPayload>>, ApiError> {
    let email = required(&request.email, "email")?;
    let plaintext = required(&request.password, "password")?;

    let found = {
        let conn = ctx.db()?;
        user::find_by_email(&conn, email)?
    };
    let account = found.ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(plaintext, &account.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = token::issue(&ctx.config.jwt_secret, &account, ctx.config.token_ttl_days)?;

    Ok(Json(Envelope::with_message(
        "Login successful",
        AuthPayload {
            user: account,
            token,
        },
    )))
}

// ═══════════════════════════════════════════════════════════
// Password reset — three stateless steps
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct CheckEmailRequest {
    pub email: Option<String>,
}

pub async fn check_email(
    State(ctx): State<ApiContext>,
    Json(request): Json<CheckEmailRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let email = required(&request.email, "email")?;

    let exists = {
        let conn = ctx.db()?;
        user::find_by_email(&conn, email)?.is_some()
    };
    if !exists {
        return Err(ApiError::NotFound(
            "No account found with this email address".into(),
        ));
    }

    Ok(Json(Envelope::message_only(
        "Email verified. Please enter your username.",
    )))
}

#[derive(Deserialize)]
pub struct VerifyUsernameRequest {
    pub email: Option<String>,
    pub username: Option<String>,
}

pub async fn verify_username(
    State(ctx): State<ApiContext>,
    Json(request): Json<VerifyUsernameRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let email = required(&request.email, "email")?;
    let username = required(&request.username, "username")?;

    let matched = {
        let conn = ctx.db()?;
        user::find_by_email_and_username(&conn, email, username)?.is_some()
    };
    if !matched {
        return Err(ApiError::NotFound(
            "Username does not match the provided email".into(),
        ));
    }

    Ok(Json(Envelope::message_only(
        "Username verified. You can now reset your password.",
    )))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub new_password: Option<String>,
}

pub async fn reset_password(
    State(ctx): State<ApiContext>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let email = required(&request.email, "email")?;
    let username = required(&request.username, "username")?;
    let new_password = required(&request.new_password, "newPassword")?;

    let conn = ctx.db()?;
    let account = user::find_by_email_and_username(&conn, email, username)?
        .ok_or(ApiError::NotFound("Invalid credentials".into()))?;

    user::update_password(&conn, &account.id, &password::hash_password(new_password))?;
    tracing::info!(username, "Password reset");

    Ok(Json(Envelope::message_only(
        "Password has been reset successfully. You can now login with your new password.",
    )))
}

// ═══════════════════════════════════════════════════════════
// GET /api/auth/profile
// ═══════════════════════════════════════════════════════════

pub async fn profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Envelope<ProfilePayload>> {
    Json(Envelope::data(ProfilePayload { user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(&None, "email").is_err());
        assert!(required(&Some("   ".into()), "email").is_err());
        assert_eq!(required(&Some(" a@x.com ".into()), "email").unwrap(), "a@x.com");
    }

    #[test]
    fn email_format_is_checked() {
        assert!(validate_email("alice@x.com").is_ok());
        assert!(validate_email("alice@clinic.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@x.com").is_err());
    }
}
