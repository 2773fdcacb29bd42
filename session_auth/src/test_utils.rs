//! Test utilities shared across the crate's test modules
//!
//! Provides a settable clock for driving sessions through their lifecycle and helpers
//! for SQLite in-memory databases with a minimal users table.

use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Mutex;

use crate::clock::Clock;
use crate::config::DB_TABLE_USERS;
use crate::storage::{SessionStore, SqliteSessionStore};

/// A clock that only moves when told to.
pub(crate) struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A fresh in-memory SQLite database.
///
/// Every connection to `sqlite::memory:` opens its own database, so the pool is capped
/// at a single connection.
pub(crate) async fn sqlite_memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database")
}

/// Insert a user row, creating the minimal users table on first use.
pub(crate) async fn create_sqlite_user(pool: &SqlitePool, user_id: &str) {
    let users_table = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {users_table} (id TEXT PRIMARY KEY NOT NULL)"
    ))
    .execute(pool)
    .await
    .expect("Failed to create users table");

    sqlx::query(&format!("INSERT INTO {users_table} (id) VALUES (?)"))
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to insert user");
}

pub(crate) async fn delete_sqlite_user(pool: &SqlitePool, user_id: &str) {
    let users_table = DB_TABLE_USERS.as_str();

    sqlx::query(&format!("DELETE FROM {users_table} WHERE id = ?"))
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to delete user");
}

/// An initialized SQLite session store whose users table holds `user_ids`.
pub(crate) async fn sqlite_store_with_users(user_ids: &[&str]) -> (SqliteSessionStore, SqlitePool) {
    let pool = sqlite_memory_pool().await;
    let users_table = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {users_table} (id TEXT PRIMARY KEY NOT NULL)"
    ))
    .execute(&pool)
    .await
    .expect("Failed to create users table");

    for user_id in user_ids {
        create_sqlite_user(&pool, user_id).await;
    }

    let store = SqliteSessionStore::new(pool.clone());
    store
        .init()
        .await
        .expect("Failed to initialize SQLite session store");

    (store, pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_set_and_advance() {
        let t0 = Utc::now();
        let clock = TestClock::at(t0);
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::days(3));
        assert_eq!(clock.now(), t0 + Duration::days(3));

        clock.set(t0);
        assert_eq!(clock.now(), t0);
    }
}
