//! Authentication data models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed session lifetime in hours
pub const SESSION_TTL_HOURS: i64 = 24;

/// Identity record. The password hash never leaves the authority boundary;
/// callers only ever see the [`PublicUser`] projection.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    /// Unique, matched exactly (case-sensitive)
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated identifier and current timestamps
    pub fn new(name: Option<String>, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client-safe projection of this user
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The subset of user fields safe to disclose to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// Proof-of-authentication record. The identifier doubles as the bearer
/// token value delivered to the client.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl Session {
    /// Create a new session for a user, expiring `ttl` from now
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Whether the expiration lies in the past
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// The client-safe projection: identifier and expiration only
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            expires_at: self.expires_at,
        }
    }
}

/// Client-visible session metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Credential verification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Successful validation payload: the joined user projection and session
/// metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub user: PublicUser,
    pub session: SessionView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_not_expired() {
        let session = Session::new(Uuid::new_v4(), Duration::hours(SESSION_TTL_HOURS));
        assert!(!session.is_expired());
        assert!(session.expires_at > session.created_at);
    }

    #[test]
    fn past_expiration_is_expired() {
        let mut session = Session::new(Uuid::new_v4(), Duration::hours(1));
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn public_projection_omits_password_hash() {
        let user = User::new(
            Some("Player One".to_string()),
            "player@example.com".to_string(),
            "$argon2id$...".to_string(),
        );
        let public = user.public();
        assert_eq!(public.id, user.id);
        assert_eq!(public.email, "player@example.com");
        let json = serde_json::to_string(&public).expect("serialize");
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }
}
