//! Cookie-backed token transport.
//!
//! The bearer session identifier travels in a single protected cookie:
//! HttpOnly (not readable by page scripts), Secure (encrypted channel only,
//! unless switched off for plain-HTTP development), SameSite=Lax (matching-
//! site requests only) and Path=/ (whole application). Its expiration
//! mirrors the session's.

use axum::http::{HeaderMap, header::COOKIE};
use chrono::{DateTime, Utc};
use gatekeeper::token::{SESSION_COOKIE, TokenTransport};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Per-request token transport over the `Cookie` / `Set-Cookie` headers.
///
/// Reads the inbound session cookie once at construction; `set`/`clear`
/// stage an outbound `Set-Cookie` header that the handler attaches to its
/// response.
pub struct CookieTransport {
    incoming: Option<Uuid>,
    pending: Mutex<Option<String>>,
    secure: bool,
}

impl CookieTransport {
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let incoming = headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(session_cookie_value);
        Self {
            incoming,
            pending: Mutex::new(None),
            secure,
        }
    }

    /// Take the staged `Set-Cookie` header value, if any operation set or
    /// cleared the token
    pub fn take_set_cookie(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn stage(&self, cookie: String) {
        *self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(cookie);
    }

    fn attributes(&self) -> &'static str {
        if self.secure {
            "Path=/; HttpOnly; Secure; SameSite=Lax"
        } else {
            "Path=/; HttpOnly; SameSite=Lax"
        }
    }
}

impl TokenTransport for CookieTransport {
    fn set(&self, session_id: Uuid, expires_at: DateTime<Utc>) {
        self.stage(format!(
            "{SESSION_COOKIE}={session_id}; Expires={}; {}",
            http_date(expires_at),
            self.attributes()
        ));
    }

    fn get(&self) -> Option<Uuid> {
        self.incoming
    }

    fn clear(&self) {
        // An already-elapsed expiration makes the client drop the cookie.
        self.stage(format!(
            "{SESSION_COOKIE}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
            self.attributes()
        ));
    }
}

/// Extract this library's session identifier from a `Cookie` header value
fn session_cookie_value(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|part| part.trim().strip_prefix(SESSION_COOKIE))
        .filter_map(|rest| rest.strip_prefix('='))
        .find_map(|value| Uuid::parse_str(value).ok())
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
