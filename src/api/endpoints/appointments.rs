//! Patient appointment endpoints: booking and the "my appointments" view.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentUser, Envelope};
use crate::db::repository::{appointment, user};
use crate::models::{Appointment, AppointmentStatus, AppointmentWithDoctor, Role};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub lab_results: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentPayload {
    pub appointment: Appointment,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{name} is required"))),
    }
}

/// `POST /api/appointments` — patient books a new appointment.
///
/// The appointment always starts `pending`; only an admin moves it on.
/// The patient may attach initial lab results at booking time.
pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(CurrentUser(patient)): Extension<CurrentUser>,
    Json(request): Json<BookRequest>,
) -> Result<(StatusCode, Json<Envelope<AppointmentPayload>>), ApiError> {
    let doctor_id = required(&request.doctor_id, "doctorId")?;
    let date_str = required(&request.date, "date")?;
    let time_str = required(&request.time, "time")?;
    let reason = required(&request.reason, "reason")?;

    let doctor_id = Uuid::parse_str(doctor_id)
        .map_err(|_| ApiError::Validation("doctorId must be a valid id".into()))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("date must be formatted YYYY-MM-DD".into()))?;
    let time = NaiveTime::parse_from_str(time_str, "%H:%M:%S")
        .map_err(|_| ApiError::Validation("time must be formatted HH:MM:SS".into()))?;

    let conn = ctx.db()?;

    // The referenced user must exist and actually be a doctor. This is only
    // validated at creation time.
    let doctor = user::find_by_id(&conn, &doctor_id)?
        .ok_or(ApiError::NotFound("Doctor not found".into()))?;
    if doctor.role != Role::Doctor {
        return Err(ApiError::Validation(
            "doctorId must reference a doctor".into(),
        ));
    }

    let now = Utc::now();
    let booked = Appointment {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        doctor_id,
        status: AppointmentStatus::Pending,
        date,
        time,
        reason: reason.to_string(),
        notes: None,
        lab_results: request
            .lab_results
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        created_at: now,
        updated_at: now,
    };
    appointment::insert_appointment(&conn, &booked)?;

    tracing::info!(
        appointment_id = %booked.id,
        patient = %patient.username,
        doctor = %doctor.username,
        "Appointment booked"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Appointment booked successfully",
            AppointmentPayload {
                appointment: booked,
            },
        )),
    ))
}

/// `GET /api/appointments/mine` — patient's own appointments, doctor joined.
pub async fn mine(
    State(ctx): State<ApiContext>,
    Extension(CurrentUser(patient)): Extension<CurrentUser>,
) -> Result<Json<Envelope<Vec<AppointmentWithDoctor>>>, ApiError> {
    let conn = ctx.db()?;
    let appointments = appointment::list_by_patient(&conn, &patient.id)?;
    Ok(Json(Envelope::data(appointments)))
}
