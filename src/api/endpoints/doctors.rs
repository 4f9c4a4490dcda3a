//! Doctor endpoints: the public directory plus doctor-only appointment
//! management (cancel, lab results).

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentUser, Envelope};
use crate::db::repository::appointment;
use crate::db::repository::user;
use crate::lifecycle;
use crate::models::{AppointmentWithPatient, UserSummary};

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid appointment id".into()))
}

/// `GET /api/doctors` — directory of doctors, visible to any authenticated
/// caller regardless of role (patients pick a doctor when booking).
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Envelope<Vec<UserSummary>>>, ApiError> {
    let conn = ctx.db()?;
    let doctors = user::list_doctors(&conn)?;
    Ok(Json(Envelope::data(doctors)))
}

/// `GET /api/doctors/appointments` — appointments assigned to the caller,
/// patient identity joined.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(CurrentUser(doctor)): Extension<CurrentUser>,
) -> Result<Json<Envelope<Vec<AppointmentWithPatient>>>, ApiError> {
    let conn = ctx.db()?;
    let assigned = appointment::list_by_doctor(&conn, &doctor.id)?;
    Ok(Json(Envelope::data(assigned)))
}

/// `PUT /api/doctors/appointments/:id/cancel` — cancel an appointment
/// assigned to the caller. Ownership is checked before the transition.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(CurrentUser(doctor)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.db()?;

    let appt = appointment::find_by_id(&conn, &id)?
        .ok_or(ApiError::NotFound("Appointment not found".into()))?;

    lifecycle::authorize_cancel(&doctor, &appt)?;
    let next = lifecycle::cancel(appt.status)?;
    appointment::update_status(&conn, &id, next)?;

    tracing::info!(appointment_id = %id, doctor = %doctor.username, "Appointment cancelled");
    Ok(Json(Envelope::message_only("Appointment cancelled")))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResultsRequest {
    pub lab_results: Option<String>,
}

/// `PUT /api/doctors/appointments/:id/lab-results` — overwrite lab results.
/// Full replace, not append; only the assigned doctor may write.
pub async fn lab_results(
    State(ctx): State<ApiContext>,
    Extension(CurrentUser(doctor)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<LabResultsRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_id(&id)?;
    let results = match request.lab_results.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("labResults is required".into())),
    };

    let conn = ctx.db()?;
    let appt = appointment::find_by_id(&conn, &id)?
        .ok_or(ApiError::NotFound("Appointment not found".into()))?;

    lifecycle::authorize_lab_results(&doctor, &appt)?;
    appointment::update_lab_results(&conn, &id, results)?;

    tracing::info!(appointment_id = %id, doctor = %doctor.username, "Lab results updated");
    Ok(Json(Envelope::message_only("Lab results updated")))
}
