//! Authentication module providing credential registration, credential
//! verification, session issuance and session validation.
//!
//! This module implements the server-authoritative session lifecycle:
//! - Argon2id password hashing with server-side pepper
//! - opaque bearer sessions with a fixed 24-hour expiry
//! - lazy expiration (expired rows are removed on next access)
//! - explicit two-armed results; no expected failure crosses the boundary
//!   as a panic or unwinding fault

pub mod authority;
pub mod errors;
pub mod models;

pub use authority::Authority;
pub use errors::{AuthError, AuthResult};
pub use models::{
    PublicUser, SESSION_TTL_HOURS, Session, SessionState, SessionView, SignInRequest,
    SignUpRequest, User,
};
