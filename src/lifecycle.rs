//! Appointment lifecycle engine.
//!
//! Legal transitions:
//!
//! ```text
//! pending ──> confirmed ──> cancelled
//!    └────────────────────────^
//! ```
//!
//! Nothing leaves `cancelled` and nothing re-enters `pending`. The source
//! system let admins confirm a cancelled appointment; here every illegal
//! transition is rejected (see DESIGN.md).
//!
//! Actor rules live here too, as exhaustive matches over the closed
//! [`Role`] enum, so the compiler flags any new role that lacks a policy.

use thiserror::Error;

use crate::models::{Appointment, AppointmentStatus, Role, User};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Appointment is not assigned to this doctor")]
    NotAssigned,

    #[error("Role {0} may not perform this operation")]
    RoleNotAllowed(&'static str),
}

/// Whether `from -> to` is a legal edge of the state machine.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
    )
}

fn transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<AppointmentStatus, LifecycleError> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(LifecycleError::InvalidTransition {
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

/// Admin confirmation. Only `pending` appointments can be confirmed.
pub fn confirm(current: AppointmentStatus) -> Result<AppointmentStatus, LifecycleError> {
    transition(current, AppointmentStatus::Confirmed)
}

/// Cancellation from either `pending` or `confirmed`.
pub fn cancel(current: AppointmentStatus) -> Result<AppointmentStatus, LifecycleError> {
    transition(current, AppointmentStatus::Cancelled)
}

/// Who may cancel a given appointment: an admin always, a doctor only when
/// assigned to it, a patient never.
pub fn authorize_cancel(user: &User, appointment: &Appointment) -> Result<(), LifecycleError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Doctor => {
            if appointment.doctor_id == user.id {
                Ok(())
            } else {
                Err(LifecycleError::NotAssigned)
            }
        }
        Role::Patient => Err(LifecycleError::RoleNotAllowed(Role::Patient.as_str())),
    }
}

/// Who may overwrite lab results after booking: only the assigned doctor.
/// (The patient may supply initial results in the booking payload itself.)
pub fn authorize_lab_results(
    user: &User,
    appointment: &Appointment,
) -> Result<(), LifecycleError> {
    match user.role {
        Role::Doctor => {
            if appointment.doctor_id == user.id {
                Ok(())
            } else {
                Err(LifecycleError::NotAssigned)
            }
        }
        Role::Admin => Err(LifecycleError::RoleNotAllowed(Role::Admin.as_str())),
        Role::Patient => Err(LifecycleError::RoleNotAllowed(Role::Patient.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;
    use AppointmentStatus::*;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: "u@x.com".into(),
            password_hash: "h".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn appointment_for(doctor_id: Uuid) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id,
            status: Pending,
            date: NaiveDate::from_ymd_opt(2025, 9, 25).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            reason: "Checkup".into(),
            notes: None,
            lab_results: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn transition_matrix_is_exact() {
        let legal = [(Pending, Confirmed), (Pending, Cancelled), (Confirmed, Cancelled)];
        for from in [Pending, Confirmed, Cancelled] {
            for to in [Pending, Confirmed, Cancelled] {
                assert_eq!(
                    can_transition(from, to),
                    legal.contains(&(from, to)),
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(confirm(Cancelled).is_err());
        assert!(cancel(Cancelled).is_err());
    }

    #[test]
    fn confirm_only_from_pending() {
        assert_eq!(confirm(Pending), Ok(Confirmed));
        assert!(matches!(
            confirm(Confirmed),
            Err(LifecycleError::InvalidTransition { .. })
        ));
        assert!(matches!(
            confirm(Cancelled),
            Err(LifecycleError::InvalidTransition {
                from: "cancelled",
                to: "confirmed"
            })
        ));
    }

    #[test]
    fn cancel_from_pending_or_confirmed() {
        assert_eq!(cancel(Pending), Ok(Cancelled));
        assert_eq!(cancel(Confirmed), Ok(Cancelled));
    }

    #[test]
    fn admin_may_cancel_anything() {
        let admin = user_with_role(Role::Admin);
        let appt = appointment_for(Uuid::new_v4());
        assert!(authorize_cancel(&admin, &appt).is_ok());
    }

    #[test]
    fn doctor_may_cancel_only_own() {
        let doctor = user_with_role(Role::Doctor);
        let own = appointment_for(doctor.id);
        let other = appointment_for(Uuid::new_v4());
        assert!(authorize_cancel(&doctor, &own).is_ok());
        assert_eq!(
            authorize_cancel(&doctor, &other),
            Err(LifecycleError::NotAssigned)
        );
    }

    #[test]
    fn patient_may_never_cancel() {
        let patient = user_with_role(Role::Patient);
        let appt = appointment_for(Uuid::new_v4());
        assert!(matches!(
            authorize_cancel(&patient, &appt),
            Err(LifecycleError::RoleNotAllowed(_))
        ));
    }

    #[test]
    fn lab_results_restricted_to_assigned_doctor() {
        let doctor = user_with_role(Role::Doctor);
        let own = appointment_for(doctor.id);
        let other = appointment_for(Uuid::new_v4());
        assert!(authorize_lab_results(&doctor, &own).is_ok());
        assert_eq!(
            authorize_lab_results(&doctor, &other),
            Err(LifecycleError::NotAssigned)
        );

        let admin = user_with_role(Role::Admin);
        assert!(authorize_lab_results(&admin, &own).is_err());
    }
}
