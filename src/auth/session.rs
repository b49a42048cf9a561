//! Session tokens and their in-memory resolution

use crate::core::error::{AppResult, AuthError, StorageError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// An opaque bearer token identifying a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate() -> Self {
        Self(format!("sess_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An active session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// In-memory session registry
///
/// Cheap to clone; all clones share the same backing map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh session for `user_id`
    pub fn issue(&self, user_id: Uuid) -> AppResult<Session> {
        let session = Session {
            token: SessionToken::generate(),
            user_id,
            issued_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;
        sessions.insert(session.token.clone(), session.clone());

        tracing::debug!(user_id = %user_id, "session issued");
        Ok(session)
    }

    /// Resolve a token to the user that owns it
    pub fn resolve(&self, token: &SessionToken) -> AppResult<Uuid> {
        let sessions = self.sessions.read().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;

        sessions
            .get(token)
            .map(|s| s.user_id)
            .ok_or_else(|| AuthError::InvalidSession.into())
    }

    /// Revoke a session; revoking an unknown token is a no-op
    pub fn revoke(&self, token: &SessionToken) -> AppResult<()> {
        let mut sessions = self.sessions.write().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;

        if sessions.remove(token).is_some() {
            tracing::debug!("session revoked");
        }
        Ok(())
    }
}
