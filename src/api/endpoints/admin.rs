//! Admin endpoints: dashboard counts, user management, appointment approval.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Envelope};
use crate::auth::password;
use crate::db::repository::{appointment, user};
use crate::lifecycle;
use crate::models::{AppointmentStatus, AppointmentWithParties, Role, User};

// ═══════════════════════════════════════════════════════════
// GET /api/admin/dashboard
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub admins: i64,
    pub doctors: i64,
    pub patients: i64,
}

#[derive(Serialize)]
pub struct AppointmentCounts {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}

#[derive(Serialize)]
pub struct Dashboard {
    pub users: UserCounts,
    pub appointments: AppointmentCounts,
}

pub async fn dashboard(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Dashboard>>, ApiError> {
    let conn = ctx.db()?;
    let dashboard = Dashboard {
        users: UserCounts {
            total: user::count_all(&conn)?,
            admins: user::count_by_role(&conn, Role::Admin)?,
            doctors: user::count_by_role(&conn, Role::Doctor)?,
            patients: user::count_by_role(&conn, Role::Patient)?,
        },
        appointments: AppointmentCounts {
            total: appointment::count_all(&conn)?,
            pending: appointment::count_by_status(&conn, AppointmentStatus::Pending)?,
            confirmed: appointment::count_by_status(&conn, AppointmentStatus::Confirmed)?,
            cancelled: appointment::count_by_status(&conn, AppointmentStatus::Cancelled)?,
        },
    };
    Ok(Json(Envelope::data(dashboard)))
}

// ═══════════════════════════════════════════════════════════
// User management
// ═══════════════════════════════════════════════════════════

pub async fn list_users(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Vec<User>>>, ApiError> {
    let conn = ctx.db()?;
    let users = user::list_all(&conn)?;
    Ok(Json(Envelope::data(users)))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct UserPayload {
    pub user: User,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{name} is required"))),
    }
}

/// `POST /api/admin/users` — create an account with any role (this is how
/// doctor accounts come into existence).
pub async fn create_user(
    State(ctx): State<ApiContext>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Envelope<UserPayload>>), ApiError> {
    let username = required(&request.username, "username")?;
    let email = required(&request.email, "email")?;
    let plaintext = required(&request.password, "password")?;
    let role = match request.role.as_deref() {
        None | Some("") => Role::Patient,
        Some(r) => Role::from_str(r)
            .map_err(|_| ApiError::Validation(format!("Invalid role: {r}")))?,
    };

    let now = Utc::now();
    let created = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(plaintext),
        role,
        created_at: now,
        updated_at: now,
    };

    let conn = ctx.db()?;
    user::insert_user(&conn, &created)?;
    tracing::info!(username, role = role.as_str(), "Admin created user");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "User created successfully",
            UserPayload { user: created },
        )),
    ))
}

/// `DELETE /api/admin/users/:id` — hard delete; the user's appointments go
/// with them (ON DELETE CASCADE).
pub async fn delete_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::Validation("Invalid user id".into()))?;

    let conn = ctx.db()?;
    if !user::delete_user(&conn, &id)? {
        return Err(ApiError::NotFound("User not found".into()));
    }

    tracing::info!(user_id = %id, "Admin deleted user");
    Ok(Json(Envelope::message_only("User deleted successfully")))
}

// ═══════════════════════════════════════════════════════════
// Appointment approval
// ═══════════════════════════════════════════════════════════

pub async fn list_appointments(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Vec<AppointmentWithParties>>>, ApiError> {
    let conn = ctx.db()?;
    let appointments = appointment::list_all(&conn)?;
    Ok(Json(Envelope::data(appointments)))
}

fn parse_appointment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid appointment id".into()))
}

/// `PUT /api/admin/appointments/:id/confirm` — only `pending` appointments
/// may be confirmed; confirming a cancelled one is rejected.
pub async fn confirm(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_appointment_id(&id)?;
    let conn = ctx.db()?;

    let appt = appointment::find_by_id(&conn, &id)?
        .ok_or(ApiError::NotFound("Appointment not found".into()))?;
    let next = lifecycle::confirm(appt.status)?;
    appointment::update_status(&conn, &id, next)?;

    tracing::info!(appointment_id = %id, "Appointment confirmed");
    Ok(Json(Envelope::message_only("Appointment confirmed")))
}

/// `PUT /api/admin/appointments/:id/cancel` — admin may cancel any
/// appointment that is not already cancelled.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_appointment_id(&id)?;
    let conn = ctx.db()?;

    let appt = appointment::find_by_id(&conn, &id)?
        .ok_or(ApiError::NotFound("Appointment not found".into()))?;
    let next = lifecycle::cancel(appt.status)?;
    appointment::update_status(&conn, &id, next)?;

    tracing::info!(appointment_id = %id, "Appointment cancelled by admin");
    Ok(Json(Envelope::message_only("Appointment cancelled")))
}
