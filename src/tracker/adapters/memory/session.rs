//! In-memory session store.

use crate::tracker::{
    domain::{Session, SessionId},
    ports::{SessionStore, SessionStoreError, SessionStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    /// Creates an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> SessionStoreError {
    SessionStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert_session(&self, session: &Session) -> SessionStoreResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn find_session(&self, id: SessionId) -> SessionStoreResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(&id).cloned())
    }

    async fn record_visit(&self, id: SessionId) -> SessionStoreResult<u64> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions
            .get_mut(&id)
            .ok_or(SessionStoreError::NotFound(id))?;
        Ok(session.record_visit())
    }

    async fn delete_session(&self, id: SessionId) -> SessionStoreResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(&id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> SessionStoreResult<u64> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at() > now);
        Ok(u64::try_from(before.saturating_sub(sessions.len())).unwrap_or(u64::MAX))
    }
}
