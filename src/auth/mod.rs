//! Credential verification: password hashing and signed session tokens.

pub mod password;
pub mod token;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Deliberately identical for unknown email and wrong password, so the
    /// login endpoint cannot be used to enumerate accounts.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token signature mismatch")]
    BadSignature,

    #[error("Stored password hash is malformed")]
    MalformedHash,
}
