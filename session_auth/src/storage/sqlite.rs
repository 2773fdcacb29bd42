use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::config::{DB_TABLE_SESSIONS, DB_TABLE_USERS};
use crate::storage::errors::StorageError;
use crate::storage::schema_validation::validate_sqlite_table_schema;

use super::types::{SessionStore, SqliteSessionStore, StoredSession};

impl SqliteSessionStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        tracing::info!("Creating SQLite session store");
        Self { pool }
    }
}

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), StorageError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            expires_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{table_name}_user_id ON {table_name}(user_id)
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Validates that the session table schema matches what we expect
pub(super) async fn validate_session_tables_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), StorageError> {
    let expected_columns = [
        ("id", "TEXT"),
        ("user_id", "TEXT"),
        ("expires_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        DB_TABLE_SESSIONS.as_str(),
        &expected_columns,
        StorageError::Schema,
    )
    .await?;

    let users_table = DB_TABLE_USERS.as_str();
    sqlx::query(&format!("SELECT id FROM {users_table} LIMIT 1"))
        .fetch_optional(pool)
        .await
        .map_err(|e| StorageError::Schema(format!("Users table '{users_table}': {e}")))?;

    Ok(())
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        create_tables_sqlite(&self.pool).await?;
        validate_session_tables_sqlite(&self.pool).await
    }

    #[tracing::instrument(skip(self, session), fields(session_id = %session.id))]
    async fn insert_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            INSERT INTO {table_name} (id, user_id, expires_at)
            VALUES (?, ?, ?)
            "#
        ))
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_session_with_user(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredSession>, StorageError> {
        let sessions = DB_TABLE_SESSIONS.as_str();
        let users = DB_TABLE_USERS.as_str();

        let session = sqlx::query_as::<_, StoredSession>(&format!(
            r#"
            SELECT s.id, s.user_id, s.expires_at
            FROM {sessions} s
            INNER JOIN {users} u ON s.user_id = u.id
            WHERE s.id = ?
            "#
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    #[tracing::instrument(skip(self))]
    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            UPDATE {table_name} SET expires_at = ? WHERE id = ?
            "#
        ))
        .bind(expires_at)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            DELETE FROM {table_name} WHERE id = ?
            "#
        ))
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
