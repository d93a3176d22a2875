//! In-memory store implementation.
//!
//! Backs tests and embedders that don't want a database. Enforces the same
//! store invariants as PostgreSQL: unique email on insert and user-to-session
//! delete cascade.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::StoreHealth;
use super::repository::{SessionStore, UserStore};
use crate::auth::{AuthError, AuthResult, Session, User};

/// Shared-map store implementing both [`UserStore`] and [`SessionStore`].
///
/// Clones share the same underlying maps, so a clone handed to the authority
/// can still be inspected by a test.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user rows
    pub fn user_count(&self) -> usize {
        lock(&self.users).len()
    }

    /// Number of stored session rows
    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Directly insert a session row, bypassing the authority. Tests use
    /// this to plant rows with arbitrary expirations.
    pub fn put_session(&self, session: Session) {
        lock(&self.sessions).insert(session.id, session);
    }
}

// The maps hold no invariants across a panic boundary; recover the guard.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        let mut users = lock(&self.users);
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateUser);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(lock(&self.users)
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> AuthResult<u64> {
        let removed = lock(&self.users).remove(&id);
        if removed.is_none() {
            return Ok(0);
        }
        lock(&self.sessions).retain(|_, s| s.user_id != id);
        Ok(1)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        lock(&self.sessions).insert(session.id, session.clone());
        Ok(())
    }

    async fn find_with_user(&self, id: Uuid) -> AuthResult<Option<(Session, User)>> {
        let session = match lock(&self.sessions).get(&id) {
            Some(s) => s.clone(),
            None => return Ok(None),
        };
        let user = lock(&self.users).get(&session.user_id).cloned();
        Ok(user.map(|u| (session, u)))
    }

    async fn delete_session(&self, id: Uuid) -> AuthResult<u64> {
        Ok(u64::from(lock(&self.sessions).remove(&id).is_some()))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    // The maps live in-process; reachable whenever the process is.
    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(email: &str) -> User {
        User::new(None, email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn insert_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@x.com")).await.expect("first insert");

        let err = store.insert_user(&user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@x.com")).await.expect("insert");

        assert!(store.find_by_email("a@x.com").await.unwrap().is_some());
        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_sessions() {
        let store = MemoryStore::new();
        let owner = user("a@x.com");
        let other = user("b@x.com");
        store.insert_user(&owner).await.expect("insert owner");
        store.insert_user(&other).await.expect("insert other");
        store.put_session(Session::new(owner.id, Duration::hours(1)));
        store.put_session(Session::new(owner.id, Duration::hours(1)));
        store.put_session(Session::new(other.id, Duration::hours(1)));

        let deleted = store.delete_user(owner.id).await.expect("delete");
        assert_eq!(deleted, 1);
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn delete_session_reports_missing_rows() {
        let store = MemoryStore::new();
        assert_eq!(store.delete_session(Uuid::new_v4()).await.unwrap(), 0);
    }
}
