use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::user::{conversion_error, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{
    Appointment, AppointmentStatus, AppointmentWithDoctor, AppointmentWithParties,
    AppointmentWithPatient, UserSummary,
};

const APPT_COLUMNS: &str = "a.id, a.patient_id, a.doctor_id, a.status, a.date, a.time, \
                            a.reason, a.notes, a.lab_results, a.created_at, a.updated_at";

fn map_appointment_row(row: &Row) -> rusqlite::Result<Appointment> {
    let id_str: String = row.get(0)?;
    let patient_str: String = row.get(1)?;
    let doctor_str: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let date_str: String = row.get(4)?;
    let time_str: String = row.get(5)?;
    Ok(Appointment {
        id: parse_uuid(0, &id_str)?,
        patient_id: parse_uuid(1, &patient_str)?,
        doctor_id: parse_uuid(2, &doctor_str)?,
        status: AppointmentStatus::from_str(&status_str).map_err(|e| conversion_error(3, e))?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| conversion_error(4, e))?,
        time: NaiveTime::parse_from_str(&time_str, "%H:%M:%S")
            .map_err(|e| conversion_error(5, e))?,
        reason: row.get(6)?,
        notes: row.get(7)?,
        lab_results: row.get(8)?,
        created_at: parse_timestamp(9, &row.get::<_, String>(9)?)?,
        updated_at: parse_timestamp(10, &row.get::<_, String>(10)?)?,
    })
}

fn map_party(row: &Row, base: usize) -> rusqlite::Result<UserSummary> {
    let id_str: String = row.get(base)?;
    Ok(UserSummary {
        id: parse_uuid(base, &id_str)?,
        username: row.get(base + 1)?,
        email: row.get(base + 2)?,
    })
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments
             (id, patient_id, doctor_id, status, date, time, reason, notes, lab_results,
              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.to_string(),
            appt.status.as_str(),
            appt.date.to_string(),
            appt.time.format("%H:%M:%S").to_string(),
            appt.reason,
            appt.notes,
            appt.lab_results,
            appt.created_at.to_rfc3339(),
            appt.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPT_COLUMNS} FROM appointments a WHERE a.id = ?1"
    ))?;
    match stmt.query_row(params![id.to_string()], map_appointment_row) {
        Ok(appt) => Ok(Some(appt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), Utc::now().to_rfc3339(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Full replace, not append: the previous value is overwritten.
pub fn update_lab_results(
    conn: &Connection,
    id: &Uuid,
    lab_results: &str,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET lab_results = ?1, updated_at = ?2 WHERE id = ?3",
        params![lab_results, Utc::now().to_rfc3339(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// A patient's own appointments, newest first, doctor identity joined.
pub fn list_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<AppointmentWithDoctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPT_COLUMNS}, d.id, d.username, d.email
         FROM appointments a
         JOIN users d ON d.id = a.doctor_id
         WHERE a.patient_id = ?1
         ORDER BY a.date DESC, a.time DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok(AppointmentWithDoctor {
            appointment: map_appointment_row(row)?,
            doctor: map_party(row, 11)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// A doctor's assigned appointments, newest first, patient identity joined.
pub fn list_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<AppointmentWithPatient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPT_COLUMNS}, p.id, p.username, p.email
         FROM appointments a
         JOIN users p ON p.id = a.patient_id
         WHERE a.doctor_id = ?1
         ORDER BY a.date DESC, a.time DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok(AppointmentWithPatient {
            appointment: map_appointment_row(row)?,
            patient: map_party(row, 11)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Every appointment with both parties joined (admin listing).
pub fn list_all(conn: &Connection) -> Result<Vec<AppointmentWithParties>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPT_COLUMNS}, p.id, p.username, p.email, d.id, d.username, d.email
         FROM appointments a
         JOIN users p ON p.id = a.patient_id
         JOIN users d ON d.id = a.doctor_id
         ORDER BY a.date DESC, a.time DESC"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(AppointmentWithParties {
            appointment: map_appointment_row(row)?,
            patient: map_party(row, 11)?,
            doctor: map_party(row, 14)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_all(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}
