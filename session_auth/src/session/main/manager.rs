use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::token::{derive_session_id, generate_session_token};
use crate::session::types::{Session, SessionValidationResult, User};
use crate::storage::{SessionStore, StorageError, StoredSession};

/// Creates, validates and revokes sessions against an explicit store handle.
///
/// The raw token never reaches the store: every operation that starts from a token hashes
/// it with [`derive_session_id`] first. The manager holds no locks of its own; each step is
/// one round-trip to the store, and concurrent writers to the same row are serialized there.
pub struct SessionManager<S: SessionStore> {
    store: Arc<S>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl<S: SessionStore> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: SessionStore> SessionManager<S> {
    /// Manager with the default 30-day lifetime and 15-day renewal window.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: SessionConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn generate_session_token(&self) -> Result<String, SessionError> {
        generate_session_token()
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, SessionError> {
        now.checked_add_signed(self.config.max_age).ok_or_else(|| {
            tracing::error!(max_age = %self.config.max_age, "Session lifetime overflows expiry");
            SessionError::ExpiryOutOfRange(format!(
                "{now} + {} is not representable",
                self.config.max_age
            ))
        })
    }

    /// Persist a new session for `user_id`, keyed by the hash of `token`.
    ///
    /// # Arguments
    /// * `token` - A token from [`generate_session_token`]
    /// * `user_id` - The owning user's identifier
    ///
    /// # Returns
    /// * `Result<Session, SessionError>` - The stored session, or an error if the insert failed
    #[tracing::instrument(skip(self, token), fields(session_id = tracing::field::Empty))]
    pub async fn create_session(&self, token: &str, user_id: &str) -> Result<Session, SessionError> {
        let session_id = derive_session_id(token);
        tracing::Span::current().record("session_id", session_id.as_str());

        let session = Session {
            id: session_id,
            user_id: user_id.to_string(),
            expires_at: self.expiry_from(self.clock.now())?,
        };

        match self.store.insert_session(&StoredSession::from(&session)).await {
            Ok(()) => {}
            Err(StorageError::Conflict(msg)) => {
                // Only reachable if the token was reused or the RNG is broken
                tracing::error!(
                    session_id = %session.id,
                    "Session identifier already exists: {}",
                    msg
                );
                return Err(SessionError::IdentifierCollision(session.id));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store session");
                return Err(e.into());
            }
        }

        tracing::debug!(expires_at = %session.expires_at, "Session created");
        Ok(session)
    }

    /// Check a presented token and apply the expiry policy.
    ///
    /// In order: no matching row (or no owning user) gives `Absent`; an expired session is
    /// deleted and gives `Absent`; a session inside the renewal window has its expiry slid
    /// to `now + max_age`; anything else is returned unchanged without a write.
    ///
    /// # Arguments
    /// * `token` - The raw session token presented by the client
    ///
    /// # Returns
    /// * `Result<SessionValidationResult, SessionError>` - `Found` or `Absent`, or a storage error
    #[tracing::instrument(skip(self, token), fields(session_id = tracing::field::Empty))]
    pub async fn validate_session_token(
        &self,
        token: &str,
    ) -> Result<SessionValidationResult, SessionError> {
        let session_id = derive_session_id(token);
        tracing::Span::current().record("session_id", session_id.as_str());

        let Some(stored) = self.store.get_session_with_user(&session_id).await? else {
            tracing::debug!("No session found");
            return Ok(SessionValidationResult::Absent);
        };

        let now = self.clock.now();

        if now >= stored.expires_at {
            tracing::debug!(expires_at = %stored.expires_at, "Session expired, deleting");
            self.store.delete_session(&stored.id).await?;
            return Ok(SessionValidationResult::Absent);
        }

        let mut session = Session::from(stored);

        let renewable = session
            .expires_at
            .checked_sub_signed(self.config.renewal_window)
            .is_none_or(|renew_from| now >= renew_from);

        if renewable {
            let expires_at = self.expiry_from(now)?;
            self.store
                .update_session_expiry(&session.id, expires_at)
                .await?;
            tracing::debug!(
                old_expires_at = %session.expires_at,
                new_expires_at = %expires_at,
                "Session renewed"
            );
            session.expires_at = expires_at;
        }

        let user = User {
            id: session.user_id.clone(),
        };

        Ok(SessionValidationResult::Found { session, user })
    }

    /// Delete a session by id, whatever its state. Unknown ids are not an error.
    #[tracing::instrument(skip(self))]
    pub async fn invalidate_session(&self, session_id: &str) -> Result<(), SessionError> {
        self.store.delete_session(session_id).await?;
        tracing::debug!("Session invalidated");
        Ok(())
    }

    /// Delete the session belonging to a raw token.
    pub async fn invalidate_session_token(&self, token: &str) -> Result<(), SessionError> {
        self.invalidate_session(&derive_session_id(token)).await
    }
}
