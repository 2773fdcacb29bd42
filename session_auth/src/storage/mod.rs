mod config;
mod errors;
mod memory;
mod postgres;
mod schema_validation;
mod sqlite;
mod types;

pub use config::store_from_env;
pub use errors::StorageError;
pub use types::{
    InMemorySessionStore, PostgresSessionStore, SessionStore, SqliteSessionStore, StoredSession,
};
