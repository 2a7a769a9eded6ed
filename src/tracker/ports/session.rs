//! Session store port.
//!
//! Sessions live outside the request-handling process, keyed by the cookie
//! value, so concurrent requests from different sessions never contend.

use crate::tracker::domain::{Session, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for session store operations.
pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// Keyed session persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a freshly started session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Persistence`] on storage failure.
    async fn insert_session(&self, session: &Session) -> SessionStoreResult<()>;

    /// Loads a session by identifier, expired or not.
    async fn find_session(&self, id: SessionId) -> SessionStoreResult<Option<Session>>;

    /// Atomically increments the session's visit counter and returns the new
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::NotFound`] when the session is gone.
    async fn record_visit(&self, id: SessionId) -> SessionStoreResult<u64>;

    /// Deletes a session. Deleting a missing session is not an error.
    async fn delete_session(&self, id: SessionId) -> SessionStoreResult<()>;

    /// Deletes every session whose expiry is at or before `now` and returns
    /// how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> SessionStoreResult<u64>;
}

/// Errors returned by session store implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    /// The session does not exist.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// Persistence-layer failure.
    #[error("session persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
