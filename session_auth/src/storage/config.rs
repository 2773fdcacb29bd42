//! Session store construction from the environment

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{env, str::FromStr};

use super::errors::StorageError;
use super::types::{
    InMemorySessionStore, PostgresSessionStore, SessionStore, SqliteSessionStore,
};

/// Build a session store from `GENERIC_DATA_STORE_TYPE` and `GENERIC_DATA_STORE_URL`.
///
/// Supported types are `memory`, `sqlite` and `postgres`. Pools connect lazily, so this
/// does not touch the database; call [`SessionStore::init`] on the result before use.
pub fn store_from_env() -> Result<Box<dyn SessionStore>, StorageError> {
    let store_type = env::var("GENERIC_DATA_STORE_TYPE")
        .map_err(|_| StorageError::Storage("GENERIC_DATA_STORE_TYPE must be set".to_string()))?;

    if store_type == "memory" {
        return build_store(&store_type, "");
    }

    let store_url = env::var("GENERIC_DATA_STORE_URL")
        .map_err(|_| StorageError::Storage("GENERIC_DATA_STORE_URL must be set".to_string()))?;

    build_store(&store_type, &store_url)
}

pub(super) fn build_store(
    store_type: &str,
    store_url: &str,
) -> Result<Box<dyn SessionStore>, StorageError> {
    tracing::info!("Initializing session store with type: {}", store_type);

    let store: Box<dyn SessionStore> = match store_type {
        "memory" => Box::new(InMemorySessionStore::new()),
        "sqlite" => {
            let opts = SqliteConnectOptions::from_str(store_url)
                .map_err(|e| {
                    StorageError::Storage(format!("Failed to parse SQLite connection string: {e}"))
                })?
                .create_if_missing(true);

            Box::new(SqliteSessionStore::new(sqlite_pool_lazy(store_url, opts)))
        }
        "postgres" => Box::new(PostgresSessionStore::new(
            sqlx::PgPool::connect_lazy(store_url).map_err(|e| {
                StorageError::Storage(format!("Failed to create Postgres pool: {e}"))
            })?,
        )),
        t => {
            return Err(StorageError::Storage(format!(
                "Unsupported store type: {t}. Supported types are 'memory', 'sqlite' and 'postgres'"
            )));
        }
    };

    Ok(store)
}

/// Each connection to an in-memory SQLite URL opens its own empty database, so such
/// pools are held to one connection that is never recycled.
fn sqlite_pool_lazy(store_url: &str, opts: SqliteConnectOptions) -> SqlitePool {
    if store_url.contains(":memory:") || store_url.contains("mode=memory") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(opts)
    } else {
        SqlitePool::connect_lazy_with(opts)
    }
}
