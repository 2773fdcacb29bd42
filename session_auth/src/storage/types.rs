use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicUsize;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

/// A session row as persisted, keyed by the derived session id.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StoredSession {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

pub struct InMemorySessionStore {
    pub(super) sessions: Mutex<HashMap<String, StoredSession>>,
    pub(super) users: Mutex<HashSet<String>>,
    pub(super) reads: AtomicUsize,
    pub(super) writes: AtomicUsize,
}

#[derive(Clone, Debug)]
pub struct SqliteSessionStore {
    pub(super) pool: sqlx::SqlitePool,
}

#[derive(Clone, Debug)]
pub struct PostgresSessionStore {
    pub(super) pool: sqlx::PgPool,
}

/// Persistence collaborator for session records.
///
/// Every method is a single round-trip to the backing store. Concurrent writes to the
/// same id are serialized by the store itself.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Initialize the store. Creates the sessions table when missing and checks that
    /// the users table is reachable.
    async fn init(&self) -> Result<(), StorageError>;

    /// Insert a new session. Fails with [`StorageError::Conflict`] when the id exists.
    async fn insert_session(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Look up a session whose owning user still exists.
    async fn get_session_with_user(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredSession>, StorageError>;

    /// Move the expiry of an existing session.
    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Delete a session. Deleting an unknown id is not an error.
    async fn delete_session(&self, session_id: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    async fn init(&self) -> Result<(), StorageError> {
        (**self).init().await
    }

    async fn insert_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        (**self).insert_session(session).await
    }

    async fn get_session_with_user(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredSession>, StorageError> {
        (**self).get_session_with_user(session_id).await
    }

    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        (**self).update_session_expiry(session_id, expires_at).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        (**self).delete_session(session_id).await
    }
}
