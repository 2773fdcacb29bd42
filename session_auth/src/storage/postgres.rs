use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::config::{DB_TABLE_SESSIONS, DB_TABLE_USERS};
use crate::storage::errors::StorageError;
use crate::storage::schema_validation::validate_postgres_table_schema;

use super::types::{PostgresSessionStore, SessionStore, StoredSession};

impl PostgresSessionStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        tracing::info!("Creating PostgreSQL session store");
        Self { pool }
    }
}

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), StorageError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL
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
pub(super) async fn validate_session_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), StorageError> {
    let expected_columns = [
        ("id", "text"),
        ("user_id", "text"),
        ("expires_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
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
impl SessionStore for PostgresSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        create_tables_postgres(&self.pool).await?;
        validate_session_tables_postgres(&self.pool).await
    }

    #[tracing::instrument(skip(self, session), fields(session_id = %session.id))]
    async fn insert_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            INSERT INTO {table_name} (id, user_id, expires_at)
            VALUES ($1, $2, $3)
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
            WHERE s.id = $1
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
            UPDATE {table_name} SET expires_at = $1 WHERE id = $2
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
            DELETE FROM {table_name} WHERE id = $1
            "#
        ))
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
