use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::enums::Role;

/// A user account. The password hash never leaves the server: it is skipped
/// on serialization and only the repository layer reads it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The safe subset of a user exposed in listings and joined views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "pbkdf2-sha256$1000$abc$def".into(),
            role: Role::Patient,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "patient");
    }

    #[test]
    fn summary_drops_sensitive_fields() {
        let user = sample_user();
        let summary = UserSummary::from(&user);
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["email"], "alice@x.com");
        assert!(json.get("role").is_none());
    }
}
