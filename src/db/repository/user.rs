use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Role, User, UserSummary};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

fn map_user_row(row: &Row) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let role_str: String = row.get(4)?;
    Ok(User {
        id: parse_uuid(0, &id_str)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::from_str(&role_str).map_err(|e| conversion_error(4, e))?,
        created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        updated_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
    })
}

pub(crate) fn parse_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

pub(crate) fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Map a failed insert to `DuplicateField` when a UNIQUE constraint on
/// username or email was hit.
fn map_unique_violation(err: rusqlite::Error) -> DatabaseError {
    if let rusqlite::Error::SqliteFailure(_, Some(msg)) = &err {
        if msg.contains("users.username") {
            return DatabaseError::DuplicateField {
                field: "username".into(),
            };
        }
        if msg.contains("users.email") {
            return DatabaseError::DuplicateField {
                field: "email".into(),
            };
        }
    }
    err.into()
}

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.password_hash,
            user.role.as_str(),
            user.created_at.to_rfc3339(),
            user.updated_at.to_rfc3339(),
        ],
    )
    .map_err(map_unique_violation)?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], map_user_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))?;
    match stmt.query_row(params![email], map_user_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lookup used by the password-reset flow: both fields must match one row.
pub fn find_by_email_and_username(
    conn: &Connection,
    email: &str,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND username = ?2"
    ))?;
    match stmt.query_row(params![email, username], map_user_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_password(
    conn: &Connection,
    id: &Uuid,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        params![password_hash, Utc::now().to_rfc3339(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Hard delete. Appointments referencing the user go with it (ON DELETE CASCADE).
pub fn delete_user(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
    Ok(deleted > 0)
}

pub fn list_all(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
    ))?;
    let rows = stmt.query_map([], map_user_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Doctor directory: safe fields only, ordered by username.
pub fn list_doctors(conn: &Connection) -> Result<Vec<UserSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email FROM users WHERE role = 'doctor' ORDER BY username",
    )?;
    let rows = stmt.query_map([], |row| {
        let id_str: String = row.get(0)?;
        Ok(UserSummary {
            id: parse_uuid(0, &id_str)?,
            username: row.get(1)?,
            email: row.get(2)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_by_role(conn: &Connection, role: Role) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = ?1",
        params![role.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_all(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}
