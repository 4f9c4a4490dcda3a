//! Signed session tokens.
//!
//! A token is `base64url(claims_json) . base64url(hmac_sha256(secret, claims_b64))`.
//! Clients treat it as opaque; the server verifies the signature in constant
//! time and checks the embedded expiry. Identity is still re-resolved against
//! the user store on every request, so a deleted user's token stops working
//! before it expires.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::AuthError;
use crate::models::{Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a token for a user, valid for `ttl_days`.
pub fn issue(secret: &str, user: &User, ttl_days: i64) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        iat: now,
        exp: now + ttl_days * 24 * 60 * 60,
    };
    let payload = serde_json::to_vec(&claims).map_err(|_| AuthError::MalformedToken)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let sig = sign(secret, payload_b64.as_bytes())?;
    Ok(format!("{payload_b64}.{}", URL_SAFE_NO_PAD.encode(sig)))
}

/// Verify signature and expiry, returning the claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
    let presented = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| AuthError::MalformedToken)?;

    let expected = sign(secret, payload_b64.as_bytes())?;
    if !bool::from(expected.ct_eq(&presented)) {
        return Err(AuthError::BadSignature);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AuthError::MalformedToken)?;
    let claims: Claims =
        serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedToken)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(AuthError::ExpiredToken);
    }
    Ok(claims)
}

fn sign(secret: &str, payload: &[u8]) -> Result<Vec<u8>, AuthError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| AuthError::BadSignature)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret";

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "h".into(),
            role: Role::Patient,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let user = sample_user();
        let token = issue(SECRET, &user, 7).unwrap();
        let claims = verify(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.role, Role::Patient);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue(SECRET, &sample_user(), 7).unwrap();
        assert_eq!(verify("other-secret", &token), Err(AuthError::BadSignature));
    }

    #[test]
    fn tampered_payload_rejected() {
        let token = issue(SECRET, &sample_user(), 7).unwrap();
        let (payload, sig) = token.split_once('.').unwrap();
        let mut forged_claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        forged_claims.role = Role::Admin;
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{sig}");
        assert_eq!(verify(SECRET, &forged), Err(AuthError::BadSignature));
    }

    #[test]
    fn expired_token_rejected() {
        // ttl of 0 days puts exp at iat, which is already in the past
        let token = issue(SECRET, &sample_user(), 0).unwrap();
        assert_eq!(verify(SECRET, &token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(verify(SECRET, "no-dot-here"), Err(AuthError::MalformedToken));
        assert_eq!(verify(SECRET, "a.b!!!"), Err(AuthError::MalformedToken));
        assert_eq!(verify(SECRET, ""), Err(AuthError::MalformedToken));
    }
}
