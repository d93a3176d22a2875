//! Integration tests for the credential and session authority.
//!
//! Drives the full lifecycle (register, authenticate, validate, terminate)
//! against the in-memory store, exactly as an embedding application would.

use gatekeeper::auth::{AuthError, Authority, SignInRequest, SignUpRequest};
use gatekeeper::db::MemoryStore;
use gatekeeper::token::{MemoryTokenTransport, TokenTransport};
use std::sync::Arc;

fn setup() -> (Authority, MemoryStore) {
    let store = MemoryStore::new();
    let authority = Authority::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        "integration_test_pepper".to_string(),
    );
    (authority, store)
}

#[tokio::test]
async fn full_session_lifecycle() {
    let (auth, store) = setup();
    let tokens = MemoryTokenTransport::new();

    // Register a new account.
    let user = auth
        .register(
            SignUpRequest {
                name: Some("Alice".to_string()),
                email: "a@x.com".to_string(),
                password: "secret".to_string(),
            },
            &tokens,
        )
        .await
        .expect("registration should succeed");
    assert_eq!(user.email, "a@x.com");

    // Wrong password is rejected without leaking which part was wrong.
    let err = auth
        .authenticate(
            SignInRequest {
                email: "a@x.com".to_string(),
                password: "wrong".to_string(),
            },
            &MemoryTokenTransport::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    // Correct credentials mint a new session, distinct from registration's.
    let registration_session = tokens.current().expect("registration token");
    let login_tokens = MemoryTokenTransport::new();
    auth.authenticate(
        SignInRequest {
            email: "a@x.com".to_string(),
            password: "secret".to_string(),
        },
        &login_tokens,
    )
    .await
    .expect("sign-in should succeed");
    let login_session = login_tokens.current().expect("login token");
    assert_ne!(registration_session, login_session);
    assert_eq!(store.session_count(), 2);

    // Validation surfaces the matching user/session pair.
    let state = auth.validate(&login_tokens).await.expect("validate");
    assert_eq!(state.user, user);
    assert_eq!(state.session.id, login_session);

    // Terminate, then the original token no longer authenticates.
    let reported = auth.terminate(&login_tokens).await.expect("terminate");
    assert_eq!(reported, user);
    let err = auth.validate(&login_tokens).await.unwrap_err();
    assert!(matches!(err, AuthError::NoActiveSession));

    // The registration session was never touched.
    let state = auth.validate(&tokens).await.expect("other session survives");
    assert_eq!(state.session.id, registration_session);
}

#[tokio::test]
async fn token_expiry_mirrors_session_expiry() {
    let (auth, store) = setup();
    let tokens = MemoryTokenTransport::new();

    auth.register(
        SignUpRequest {
            name: None,
            email: "b@x.com".to_string(),
            password: "secret".to_string(),
        },
        &tokens,
    )
    .await
    .expect("register");

    let state = auth.validate(&tokens).await.expect("validate");
    assert_eq!(
        tokens.expiry().expect("token carries expiry"),
        state.session.expires_at
    );
    assert_eq!(store.session_count(), 1);
}

#[tokio::test]
async fn concurrent_terminations_race_cleanly() {
    let (auth, _store) = setup();
    let tokens = MemoryTokenTransport::new();

    auth.register(
        SignUpRequest {
            name: None,
            email: "c@x.com".to_string(),
            password: "secret".to_string(),
        },
        &tokens,
    )
    .await
    .expect("register");

    let session_id = tokens.current().expect("token");

    // Two callers race on the same identifier: the winner succeeds, the
    // loser observes a normal terminal condition rather than a crash.
    let first = auth.terminate(&tokens).await;
    let stale = MemoryTokenTransport::new();
    stale.set(session_id, chrono::Utc::now() + chrono::Duration::hours(1));
    let second = auth.terminate(&stale).await;

    assert!(first.is_ok());
    assert!(matches!(second.unwrap_err(), AuthError::SessionNotFound));
}
