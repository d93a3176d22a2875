//! Credential and session authority implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{PublicUser, SESSION_TTL_HOURS, Session, SessionState, SignInRequest, SignUpRequest, User},
};
use crate::db::{SessionStore, UserStore};
use crate::token::TokenTransport;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Duration;
use log::debug;
use std::sync::Arc;

/// Owns the session lifecycle state machine: registering users, verifying
/// credentials, minting sessions, validating sessions and revoking sessions.
///
/// Holds only immutable collaborator references; there is no in-process lock
/// or shared mutable state between calls. Each operation is an independent
/// unit of work against the store.
#[derive(Clone)]
pub struct Authority {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    pepper: String,
    session_ttl: Duration,
}

impl Authority {
    /// Create a new authority with the fixed 24-hour session lifetime
    ///
    /// # Arguments
    ///
    /// * `users` - User store collaborator
    /// * `sessions` - Session store collaborator
    /// * `pepper` - Server-side pepper for password hashing
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>, pepper: String) -> Self {
        Self {
            users,
            sessions,
            pepper,
            session_ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    /// Override the session lifetime. Tests use this to mint sessions that
    /// are already expired.
    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Register a new user and issue a fresh session.
    ///
    /// # Errors
    ///
    /// * [`AuthError::DuplicateUser`] - email already registered
    /// * [`AuthError::Transport`] - empty email or password (the HTTP adapter
    ///   rejects these before calling; direct callers are tolerated here)
    /// * [`AuthError::Store`] - persistence failure
    pub async fn register(
        &self,
        request: SignUpRequest,
        tokens: &dyn TokenTransport,
    ) -> AuthResult<PublicUser> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AuthError::Transport(
                "email and password must be non-empty".to_string(),
            ));
        }

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = self.hash_password(&request.password).await?;
        let user = User::new(request.name, request.email, password_hash);
        // The two inserts are deliberately not wrapped in one transaction;
        // a failure at session insert leaves a user with no session, which
        // is harmless: the user can authenticate later.
        self.users.insert_user(&user).await?;

        let public = user.public();
        self.open_session(&user, tokens).await?;
        debug!("registered user {}", user.id);
        Ok(public)
    }

    /// Verify credentials and issue a fresh session.
    ///
    /// Sign-in always creates a new session; existing sessions for the same
    /// user stay valid. Unknown email and wrong password both surface as
    /// [`AuthError::InvalidCredentials`].
    pub async fn authenticate(
        &self,
        request: SignInRequest,
        tokens: &dyn TokenTransport,
    ) -> AuthResult<PublicUser> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(&request.password, &user.password_hash)
            .await?;

        let public = user.public();
        self.open_session(&user, tokens).await?;
        debug!("authenticated user {}", user.id);
        Ok(public)
    }

    /// Revoke the caller's session and clear its token.
    ///
    /// # Errors
    ///
    /// * [`AuthError::NoActiveSession`] - no token presented; the store is
    ///   not touched
    /// * [`AuthError::SessionNotFound`] - the token references no session,
    ///   or the row was concurrently removed
    pub async fn terminate(&self, tokens: &dyn TokenTransport) -> AuthResult<PublicUser> {
        let session_id = tokens.get().ok_or(AuthError::NoActiveSession)?;

        let (_, user) = self
            .sessions
            .find_with_user(session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        // A concurrent terminate/expiry may have removed the row between the
        // join and the delete; the second caller observes SessionNotFound.
        if self.sessions.delete_session(session_id).await? == 0 {
            return Err(AuthError::SessionNotFound);
        }

        tokens.clear();
        debug!("terminated session {session_id}");
        Ok(user.public())
    }

    /// Validate the caller's session and return the joined user projection
    /// and session metadata.
    ///
    /// Expiration is lazy: an expired row is deleted here, the token is
    /// cleared, and the caller sees [`AuthError::SessionExpired`]. A row may
    /// persist past its expiration until it is next touched.
    pub async fn validate(&self, tokens: &dyn TokenTransport) -> AuthResult<SessionState> {
        let session_id = tokens.get().ok_or(AuthError::NoActiveSession)?;

        let (session, user) = self
            .sessions
            .find_with_user(session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            self.sessions.delete_session(session_id).await?;
            tokens.clear();
            debug!("removed expired session {session_id}");
            return Err(AuthError::SessionExpired);
        }

        Ok(SessionState {
            user: user.public(),
            session: session.view(),
        })
    }

    /// Mint a session for the user and emit its token
    async fn open_session(&self, user: &User, tokens: &dyn TokenTransport) -> AuthResult<()> {
        let session = Session::new(user.id, self.session_ttl);
        self.sessions.insert_session(&session).await?;
        tokens.set(session.id, session.expires_at);
        Ok(())
    }

    /// Hash password with Argon2id + pepper, off the request thread
    async fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(peppered.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|_| AuthError::Internal("password hashing failed".to_string()))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("hash task failed: {e}")))?
    }

    /// Verify password against a stored hash, off the request thread
    async fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash).map_err(|_| AuthError::InvalidCredentials)?;
            Argon2::default()
                .verify_password(peppered.as_bytes(), &parsed)
                .map_err(|_| AuthError::InvalidCredentials)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("verify task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::token::MemoryTokenTransport;

    fn authority(store: &MemoryStore) -> Authority {
        Authority::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            "test_pepper".to_string(),
        )
    }

    fn sign_up(email: &str) -> SignUpRequest {
        SignUpRequest {
            name: None,
            email: email.to_string(),
            password: "SecurePass123".to_string(),
        }
    }

    fn sign_in(email: &str, password: &str) -> SignInRequest {
        SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_issues_user_and_session() {
        let store = MemoryStore::new();
        let auth = authority(&store);
        let tokens = MemoryTokenTransport::new();

        let user = auth
            .register(sign_up("a@x.com"), &tokens)
            .await
            .expect("registration should succeed");

        assert_eq!(user.email, "a@x.com");
        assert_eq!(store.user_count(), 1);
        assert_eq!(store.session_count(), 1);
        assert!(tokens.current().is_some(), "token should be issued");
    }

    #[tokio::test]
    async fn register_duplicate_email_fails_second_call() {
        let store = MemoryStore::new();
        let auth = authority(&store);

        auth.register(sign_up("a@x.com"), &MemoryTokenTransport::new())
            .await
            .expect("first registration should succeed");

        let err = auth
            .register(sign_up("a@x.com"), &MemoryTokenTransport::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
        assert_eq!(store.user_count(), 1, "store retains exactly one user row");
    }

    #[tokio::test]
    async fn register_rejects_empty_credentials() {
        let store = MemoryStore::new();
        let auth = authority(&store);

        let request = SignUpRequest {
            name: None,
            email: "a@x.com".to_string(),
            password: String::new(),
        };
        let err = auth
            .register(request, &MemoryTokenTransport::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn validate_after_register_is_idempotent() {
        let store = MemoryStore::new();
        let auth = authority(&store);
        let tokens = MemoryTokenTransport::new();

        let user = auth
            .register(sign_up("a@x.com"), &tokens)
            .await
            .expect("register");
        let issued = tokens.current().expect("token issued");

        let first = auth.validate(&tokens).await.expect("first validate");
        assert_eq!(first.session.id, issued);
        assert_eq!(first.user, user);

        let second = auth.validate(&tokens).await.expect("second validate");
        assert_eq!(second.session.id, issued, "same session surfaces");
        assert_eq!(store.session_count(), 1, "no new row created");
    }

    #[tokio::test]
    async fn authenticate_wrong_password_and_unknown_email_are_uniform() {
        let store = MemoryStore::new();
        let auth = authority(&store);

        auth.register(sign_up("a@x.com"), &MemoryTokenTransport::new())
            .await
            .expect("register");

        let tokens = MemoryTokenTransport::new();
        let wrong_password = auth
            .authenticate(sign_in("a@x.com", "wrong"), &tokens)
            .await
            .unwrap_err();
        let unknown_email = auth
            .authenticate(sign_in("b@x.com", "SecurePass123"), &tokens)
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert!(tokens.current().is_none(), "no token on failure");
    }

    #[tokio::test]
    async fn authenticate_mints_independent_sessions() {
        let store = MemoryStore::new();
        let auth = authority(&store);

        auth.register(sign_up("a@x.com"), &MemoryTokenTransport::new())
            .await
            .expect("register");

        let first = MemoryTokenTransport::new();
        let second = MemoryTokenTransport::new();
        auth.authenticate(sign_in("a@x.com", "SecurePass123"), &first)
            .await
            .expect("first sign-in");
        auth.authenticate(sign_in("a@x.com", "SecurePass123"), &second)
            .await
            .expect("second sign-in");

        let first_id = first.current().expect("first token");
        let second_id = second.current().expect("second token");
        assert_ne!(first_id, second_id, "each sign-in mints a fresh session");

        // Both are independently valid.
        assert!(auth.validate(&first).await.is_ok());
        assert!(auth.validate(&second).await.is_ok());

        // Terminating one leaves the other untouched.
        auth.terminate(&first).await.expect("terminate first");
        assert!(auth.validate(&second).await.is_ok());
    }

    #[tokio::test]
    async fn expired_session_is_cleaned_up_one_way() {
        let store = MemoryStore::new();
        let auth = authority(&store).with_session_ttl(Duration::seconds(-1));
        let tokens = MemoryTokenTransport::new();

        auth.register(sign_up("a@x.com"), &tokens)
            .await
            .expect("register");
        assert_eq!(store.session_count(), 1);

        let err = auth.validate(&tokens).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionExpired));
        assert_eq!(store.session_count(), 0, "expired row removed lazily");

        // The token was cleared, so the next touch reports no session at all.
        let err = auth.validate(&tokens).await.unwrap_err();
        assert!(matches!(err, AuthError::NoActiveSession));
    }

    #[tokio::test]
    async fn terminate_then_validate_reports_no_active_session() {
        let store = MemoryStore::new();
        let auth = authority(&store);
        let tokens = MemoryTokenTransport::new();

        let user = auth
            .register(sign_up("a@x.com"), &tokens)
            .await
            .expect("register");

        let reported = auth.terminate(&tokens).await.expect("terminate");
        assert_eq!(reported, user);
        assert_eq!(store.session_count(), 0);

        let err = auth.validate(&tokens).await.unwrap_err();
        assert!(
            matches!(err, AuthError::NoActiveSession),
            "token was cleared, so NoActiveSession rather than SessionNotFound"
        );
    }

    #[tokio::test]
    async fn terminate_without_token_leaves_store_untouched() {
        let store = MemoryStore::new();
        let auth = authority(&store);

        auth.register(sign_up("a@x.com"), &MemoryTokenTransport::new())
            .await
            .expect("register");
        let sessions_before = store.session_count();

        let err = auth.terminate(&MemoryTokenTransport::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::NoActiveSession));
        assert_eq!(store.session_count(), sessions_before);
    }

    #[tokio::test]
    async fn stale_token_reports_session_not_found() {
        let store = MemoryStore::new();
        let auth = authority(&store);

        let tokens = MemoryTokenTransport::new();
        tokens.set(uuid::Uuid::new_v4(), chrono::Utc::now() + Duration::hours(1));

        let err = auth.validate(&tokens).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));

        let err = auth.terminate(&tokens).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }
}
