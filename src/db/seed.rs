//! Demo data seeding for fresh databases.
//!
//! Mirrors the deployment's seed data: one admin, one patient, one doctor
//! (shared password `password123`) and a pending demo appointment. Skipped
//! entirely when any user already exists, so restarts are safe.

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use super::repository::{appointment, user};
use super::DatabaseError;
use crate::auth::password;
use crate::models::{Appointment, AppointmentStatus, Role, User};

pub const DEMO_PASSWORD: &str = "password123";

fn demo_user(username: &str, email: &str, role: Role, password_hash: String) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: username.into(),
        email: email.into(),
        password_hash,
        role,
        created_at: now,
        updated_at: now,
    }
}

/// Seed demo accounts and one demo appointment on an empty database.
/// Returns `true` when seeding ran.
pub fn seed_demo_users(conn: &Connection) -> Result<bool, DatabaseError> {
    seed_demo_users_with_iterations(conn, password::PBKDF2_ITERATIONS)
}

/// Iteration count is injectable so tests can seed quickly.
pub fn seed_demo_users_with_iterations(
    conn: &Connection,
    iterations: u32,
) -> Result<bool, DatabaseError> {
    if user::count_all(conn)? > 0 {
        return Ok(false);
    }

    // One hash shared by all demo accounts, like the original seeder.
    let hash = password::hash_password_with(DEMO_PASSWORD, iterations);

    let admin = demo_user("admin", "admin@example.com", Role::Admin, hash.clone());
    let patient = demo_user("patient", "patient@example.com", Role::Patient, hash.clone());
    let doctor = demo_user("doctor", "doctor@example.com", Role::Doctor, hash);
    user::insert_user(conn, &admin)?;
    user::insert_user(conn, &patient)?;
    user::insert_user(conn, &doctor)?;

    let now = Utc::now();
    appointment::insert_appointment(
        conn,
        &Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            status: AppointmentStatus::Pending,
            date: NaiveDate::from_ymd_opt(2025, 9, 25).unwrap_or_default(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            reason: "General check-up".into(),
            notes: None,
            lab_results: None,
            created_at: now,
            updated_at: now,
        },
    )?;

    tracing::info!("Seeded demo users (admin, patient, doctor) and demo appointment");
    Ok(true)
}
