//! session-auth - Opaque-token session authentication
//!
//! Clients hold a random token; the store only ever sees its SHA-256 digest. Sessions
//! live for 30 days and slide forward when used within the last 15, so active users stay
//! signed in while idle sessions lapse and are removed on their next read.
//!
//! ```no_run
//! use std::sync::Arc;
//! use session_auth::{InMemorySessionStore, SessionManager, SessionValidationResult};
//!
//! # async fn demo() -> Result<(), session_auth::SessionError> {
//! let store = Arc::new(InMemorySessionStore::new());
//! store.add_user("user-1").await;
//! let manager = SessionManager::new(store);
//!
//! let token = manager.generate_session_token()?;
//! manager.create_session(&token, "user-1").await?;
//!
//! if let SessionValidationResult::Found { session, user } =
//!     manager.validate_session_token(&token).await?
//! {
//!     println!("{} until {}", user.id, session.expires_at);
//! }
//! # Ok(())
//! # }
//! ```

mod clock;
mod config;
mod session;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use session::{
    Session, SessionError, SessionManager, SessionValidationResult, User, derive_session_id,
    generate_session_token,
};
pub use storage::{
    InMemorySessionStore, PostgresSessionStore, SessionStore, SqliteSessionStore, StorageError,
    StoredSession, store_from_env,
};
pub use utils::UtilError;
