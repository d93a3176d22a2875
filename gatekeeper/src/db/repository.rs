//! Store trait definitions and their PostgreSQL implementations.
//!
//! The authority depends on these traits, never on a concrete store, so the
//! persistence engine stays an external collaborator specified only at its
//! interface boundary: insert, select and delete with a uniqueness constraint
//! on email and a session-to-user cascade.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::auth::{AuthError, AuthResult, Session, User};

/// User store operations
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user row. Fails with [`AuthError::DuplicateUser`] if the
    /// email is already taken (the store backstops the authority's lookup).
    async fn insert_user(&self, user: &User) -> AuthResult<()>;

    /// Find a user by exact email match
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Find a user by identifier
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;

    /// Delete a user; all of its sessions are removed by cascade. Returns
    /// the number of user rows deleted.
    async fn delete_user(&self, id: Uuid) -> AuthResult<u64>;
}

/// Session store operations
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session row
    async fn insert_session(&self, session: &Session) -> AuthResult<()>;

    /// Join a session to its owning user
    async fn find_with_user(&self, id: Uuid) -> AuthResult<Option<(Session, User)>>;

    /// Delete a session, returning the number of rows removed. Zero rows is
    /// a normal terminal condition when callers race on the same identifier.
    async fn delete_session(&self, id: Uuid) -> AuthResult<u64>;
}

/// PostgreSQL implementation of [`UserStore`]
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AuthError::DuplicateUser
            } else {
                AuthError::Store(e)
            }
        })?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn delete_user(&self, id: Uuid) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// PostgreSQL implementation of [`SessionStore`]
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, expires_at, created_at, updated_at, user_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(session.id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.updated_at)
        .bind(session.user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_with_user(&self, id: Uuid) -> AuthResult<Option<(Session, User)>> {
        let row = sqlx::query(
            "SELECT s.id, s.expires_at, s.created_at, s.updated_at, s.user_id,
                    u.id AS u_id, u.name, u.email, u.password_hash,
                    u.created_at AS u_created_at, u.updated_at AS u_updated_at
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let session = Session {
                id: r.get("id"),
                expires_at: r.get::<DateTime<Utc>, _>("expires_at"),
                created_at: r.get::<DateTime<Utc>, _>("created_at"),
                updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
                user_id: r.get("user_id"),
            };
            let user = User {
                id: r.get("u_id"),
                name: r.get("name"),
                email: r.get("email"),
                password_hash: r.get("password_hash"),
                created_at: r.get::<DateTime<Utc>, _>("u_created_at"),
                updated_at: r.get::<DateTime<Utc>, _>("u_updated_at"),
            };
            (session, user)
        }))
    }

    async fn delete_session(&self, id: Uuid) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
