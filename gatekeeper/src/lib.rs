//! # Gatekeeper
//!
//! Stateful, server-authoritative session authentication for application
//! backends that need password-based login without adopting a full identity
//! provider.
//!
//! The library is built around three collaborators, all injected into the
//! [`auth::Authority`] at construction time:
//!
//! - a persistent store ([`db::UserStore`] / [`db::SessionStore`]), with a
//!   PostgreSQL implementation and an in-memory implementation
//! - an opaque one-way password hash (Argon2id with a server-side pepper)
//! - a token transport ([`token::TokenTransport`]) carrying the bearer
//!   session identifier to and from the caller
//!
//! ## Session lifecycle
//!
//! A session is created by `register` or `authenticate`, validated while its
//! expiration lies in the future, and removed when it is found expired or is
//! explicitly revoked. Expiration is lazy: expired rows are deleted when next
//! touched, not by a background sweeper.
//!
//! ## Example
//!
//! ```no_run
//! use gatekeeper::auth::{Authority, SignUpRequest};
//! use gatekeeper::db::MemoryStore;
//! use gatekeeper::token::MemoryTokenTransport;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let authority = Authority::new(
//!         Arc::new(store.clone()),
//!         Arc::new(store),
//!         "secret_pepper".to_string(),
//!     );
//!
//!     let tokens = MemoryTokenTransport::new();
//!     let user = authority
//!         .register(
//!             SignUpRequest {
//!                 name: Some("Player One".to_string()),
//!                 email: "player@example.com".to_string(),
//!                 password: "SecurePass123".to_string(),
//!             },
//!             &tokens,
//!         )
//!         .await?;
//!     println!("Registered user: {}", user.email);
//!     Ok(())
//! }
//! ```

/// Credential and session authority: the lifecycle state machine.
pub mod auth;
pub use auth::{AuthError, AuthResult, Authority};

/// Persistent store collaborator (PostgreSQL and in-memory).
pub mod db;
pub use db::{Database, DatabaseConfig, MemoryStore, SessionStore, StoreHealth, UserStore};

/// Token transport collaborator.
pub mod token;
pub use token::{MemoryTokenTransport, SESSION_COOKIE, TokenTransport};
