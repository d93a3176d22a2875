//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with the given email already exists
    #[error("an account with this email already exists")]
    DuplicateUser,

    /// Unknown email or wrong password. The two cases are deliberately not
    /// distinguished so responses never reveal whether an email is registered.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The caller presented no session token
    #[error("no active session")]
    NoActiveSession,

    /// The presented token references no stored session
    #[error("session not found")]
    SessionNotFound,

    /// The session's expiration lies in the past
    #[error("session expired")]
    SessionExpired,

    /// Underlying persistence failure
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Internal fault (password hashing, task join)
    #[error("internal error: {0}")]
    Internal(String),

    /// Malformed or unsupported wire action
    #[error("{0}")]
    Transport(String),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information.
    ///
    /// Store and internal errors are sanitized to prevent disclosure of
    /// SQL details or internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) | AuthError::Internal(_) => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
