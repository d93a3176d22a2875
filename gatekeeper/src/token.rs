//! Token transport collaborator.
//!
//! A session is a bearer credential: possession of its identifier is
//! sufficient to authenticate. The authority never touches the wire itself;
//! it hands the identifier to a [`TokenTransport`] supplied by the caller
//! (an HTTP adapter backs this with a protected cookie, direct library
//! callers can use [`MemoryTokenTransport`]).

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Fixed cookie name distinguishing this library's token from others
pub const SESSION_COOKIE: &str = "gatekeeper.session_token";

/// Set/get/clear an opaque session token associated with the caller.
///
/// Implementations must treat the channel as security-sensitive: the HTTP
/// adapter marks the cookie HttpOnly, Secure, SameSite=Lax and scopes it to
/// the whole application path.
pub trait TokenTransport: Send + Sync {
    /// Emit the token to the caller, with an expiration mirroring the session
    fn set(&self, session_id: Uuid, expires_at: DateTime<Utc>);

    /// Read the session identifier presented by the caller, if any
    fn get(&self) -> Option<Uuid>;

    /// Remove the token from the caller's channel
    fn clear(&self);
}

/// In-process token slot for tests and non-HTTP embedders
#[derive(Debug, Default)]
pub struct MemoryTokenTransport {
    slot: Mutex<Option<(Uuid, DateTime<Utc>)>>,
}

impl MemoryTokenTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held session identifier
    pub fn current(&self) -> Option<Uuid> {
        self.lock().map(|(id, _)| id)
    }

    /// Expiration of the currently held token
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.lock().map(|(_, expires_at)| expires_at)
    }

    fn lock(&self) -> Option<(Uuid, DateTime<Utc>)> {
        *lock_slot(&self.slot)
    }
}

impl TokenTransport for MemoryTokenTransport {
    fn set(&self, session_id: Uuid, expires_at: DateTime<Utc>) {
        *lock_slot(&self.slot) = Some((session_id, expires_at));
    }

    fn get(&self) -> Option<Uuid> {
        self.current()
    }

    fn clear(&self) {
        *lock_slot(&self.slot) = None;
    }
}

// A poisoned slot still holds valid data; recover the guard.
fn lock_slot<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
