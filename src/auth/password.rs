//! PBKDF2-SHA256 password hashing.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt_b64>$<hash_b64>`
//! (base64 URL-safe, no padding). The iteration count is embedded so it
//! can be raised later without invalidating existing hashes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::AuthError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

const SCHEME: &str = "pbkdf2-sha256";

/// Hash a password with the production iteration count.
pub fn hash_password(password: &str) -> String {
    hash_password_with(password, PBKDF2_ITERATIONS)
}

/// Hash with an explicit iteration count (tests use a low count).
pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let salt = generate_salt();
    let hash = derive(password, &salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash),
    )
}

/// Verify a password against a stored hash string. Comparison of the
/// derived key is constant-time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let mut parts = stored.split('$');
    let scheme = parts.next().ok_or(AuthError::MalformedHash)?;
    if scheme != SCHEME {
        return Err(AuthError::MalformedHash);
    }
    let iterations: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(AuthError::MalformedHash)?;
    let salt = parts
        .next()
        .and_then(|s| URL_SAFE_NO_PAD.decode(s).ok())
        .ok_or(AuthError::MalformedHash)?;
    let expected = parts
        .next()
        .and_then(|s| URL_SAFE_NO_PAD.decode(s).ok())
        .ok_or(AuthError::MalformedHash)?;
    if parts.next().is_some() || expected.len() != HASH_LENGTH {
        return Err(AuthError::MalformedHash);
    }

    let derived = derive(password, &salt, iterations);
    Ok(derived.ct_eq(&expected).into())
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ITERS: u32 = 1_000;

    #[test]
    fn hash_then_verify_round_trip() {
        let stored = hash_password_with("pw123456", TEST_ITERS);
        assert!(verify_password("pw123456", &stored).unwrap());
    }

    #[test]
    fn wrong_password_rejected() {
        let stored = hash_password_with("pw123456", TEST_ITERS);
        assert!(!verify_password("hunter2", &stored).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password_with("pw123456", TEST_ITERS);
        let b = hash_password_with("pw123456", TEST_ITERS);
        assert_ne!(a, b); // random salt
        assert!(verify_password("pw123456", &a).unwrap());
        assert!(verify_password("pw123456", &b).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert_eq!(
            verify_password("pw", "not-a-hash"),
            Err(AuthError::MalformedHash)
        );
        assert_eq!(
            verify_password("pw", "bcrypt$10$abc$def"),
            Err(AuthError::MalformedHash)
        );
        assert_eq!(
            verify_password("pw", "pbkdf2-sha256$notanumber$abc$def"),
            Err(AuthError::MalformedHash)
        );
    }

    #[test]
    fn stored_format_embeds_iterations() {
        let stored = hash_password_with("pw", 1234);
        assert!(stored.starts_with("pbkdf2-sha256$1234$"));
    }
}
