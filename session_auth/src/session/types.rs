use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StoredSession;

/// A live session, identified by the hash of its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// The user owning a session. Only the identifier is known to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

/// Outcome of validating a presented session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationResult {
    Found { session: Session, user: User },
    Absent,
}

impl SessionValidationResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Found { session, .. } => Some(session),
            Self::Absent => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Found { user, .. } => Some(user),
            Self::Absent => None,
        }
    }

    pub fn into_parts(self) -> Option<(Session, User)> {
        match self {
            Self::Found { session, user } => Some((session, user)),
            Self::Absent => None,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            id: stored.id,
            user_id: stored.user_id,
            expires_at: stored.expires_at,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            user_id: session.user_id.clone(),
            expires_at: session.expires_at,
        }
    }
}
