use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

use super::types::{InMemorySessionStore, SessionStore, StoredSession};

impl InMemorySessionStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            sessions: Mutex::new(HashMap::new()),
            users: Mutex::new(HashSet::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Register a user id so that sessions owned by it resolve on lookup.
    pub async fn add_user(&self, user_id: &str) {
        self.users.lock().await.insert(user_id.to_string());
    }

    pub async fn remove_user(&self, user_id: &str) {
        self.users.lock().await.remove(user_id);
    }

    /// Number of lookups served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of inserts, updates and deletes applied.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw row access, bypassing the user join and the counters.
    pub async fn peek_session(&self, session_id: &str) -> Option<StoredSession> {
        self.sessions.lock().await.get(session_id).cloned()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn insert_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            return Err(StorageError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_session_with_user(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredSession>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(session_id) else {
            return Ok(None);
        };
        let users = self.users.lock().await;
        Ok(users.contains(&session.user_id).then(|| session.clone()))
    }

    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if let Some(session) = self.sessions.lock().await.get_mut(session_id) {
            session.expires_at = expires_at;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        self.sessions.lock().await.remove(session_id);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stored(id: &str, user_id: &str) -> StoredSession {
        StoredSession {
            id: id.to_string(),
            user_id: user_id.to_string(),
            expires_at: Utc::now() + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_init() {
        let store = InMemorySessionStore::new();
        assert!(store.init().await.is_ok());
    }

    #[tokio::test]
    async fn test_insert_and_get_with_user() {
        // Given a store with a registered user
        let store = InMemorySessionStore::new();
        store.add_user("user-1").await;
        let session = stored("sid-1", "user-1");

        // When inserting a session for that user
        store.insert_session(&session).await.unwrap();

        // Then the joined lookup returns it
        let fetched = store.get_session_with_user("sid-1").await.unwrap();
        assert_eq!(fetched, Some(session));
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_get_without_user_is_none() {
        // Given a session whose owner is not a known user
        let store = InMemorySessionStore::new();
        store
            .insert_session(&stored("sid-orphan", "ghost"))
            .await
            .unwrap();

        // When looking it up through the join
        let fetched = store.get_session_with_user("sid-orphan").await.unwrap();

        // Then nothing is returned, but the row is still there
        assert!(fetched.is_none());
        assert!(store.peek_session("sid-orphan").await.is_some());
    }

    #[tokio::test]
    async fn test_removed_user_hides_sessions() {
        let store = InMemorySessionStore::new();
        store.add_user("user-2").await;
        store
            .insert_session(&stored("sid-2", "user-2"))
            .await
            .unwrap();

        store.remove_user("user-2").await;

        assert!(store.get_session_with_user("sid-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_conflict() {
        // Given an existing session
        let store = InMemorySessionStore::new();
        store.add_user("user-a").await;
        let original = stored("sid-dup", "user-a");
        store.insert_session(&original).await.unwrap();

        // When inserting another row with the same id for a different user
        let result = store.insert_session(&stored("sid-dup", "user-b")).await;

        // Then the insert is rejected and the original row is untouched
        assert!(matches!(result, Err(StorageError::Conflict(_))));
        assert_eq!(store.peek_session("sid-dup").await, Some(original));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_update_session_expiry() {
        let store = InMemorySessionStore::new();
        store.add_user("user-3").await;
        store
            .insert_session(&stored("sid-3", "user-3"))
            .await
            .unwrap();

        let new_expiry = Utc::now() + Duration::days(45);
        store
            .update_session_expiry("sid-3", new_expiry)
            .await
            .unwrap();

        let fetched = store.peek_session("sid-3").await.unwrap();
        assert_eq!(fetched.expires_at, new_expiry);
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        // Given a stored session
        let store = InMemorySessionStore::new();
        store.add_user("user-4").await;
        store
            .insert_session(&stored("sid-4", "user-4"))
            .await
            .unwrap();

        // When deleting it twice
        store.delete_session("sid-4").await.unwrap();
        let second = store.delete_session("sid-4").await;

        // Then both calls succeed and the row is gone
        assert!(second.is_ok());
        assert!(store.peek_session("sid-4").await.is_none());
    }
}
