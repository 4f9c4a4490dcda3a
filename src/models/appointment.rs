use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::enums::AppointmentStatus;
use super::user::UserSummary;

/// An appointment row. Status starts at `pending` and only moves along the
/// transitions enforced by [`crate::lifecycle`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub status: AppointmentStatus,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub notes: Option<String>,
    pub lab_results: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Patient-facing view: the appointment plus the assigned doctor's identity.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithDoctor {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: UserSummary,
}

/// Doctor-facing view: the appointment plus the owning patient's identity.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithPatient {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: UserSummary,
}

/// Admin-facing view: both parties joined.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithParties {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: UserSummary,
    pub doctor: UserSummary,
}
