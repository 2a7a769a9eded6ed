//! Login, session resolution, and logout.

use crate::tracker::{
    domain::{Session, SessionId, Username, Worker},
    ports::{SessionStore, SessionStoreError, TrackerRepositoryError, TrackerStore},
};
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Message shown when a login attempt fails.
pub const INVALID_LOGIN_MESSAGE: &str = "Please enter a correct username and password.";

/// A live session and the worker it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// The session.
    pub session: Session,
    /// The logged-in worker.
    pub worker: Worker,
}

/// Service-level errors for authentication.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("Please enter a correct username and password.")]
    InvalidCredentials,
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),
    /// Session store operation failed.
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication service.
pub struct AuthService<R: ?Sized, S: ?Sized, C> {
    store: Arc<R>,
    sessions: Arc<S>,
    clock: Arc<C>,
    ttl: Duration,
}

impl<R, S, C> AuthService<R, S, C>
where
    R: TrackerStore + ?Sized,
    S: SessionStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a service issuing sessions that last `ttl`.
    #[must_use]
    pub const fn new(store: Arc<R>, sessions: Arc<S>, clock: Arc<C>, ttl: Duration) -> Self {
        Self {
            store,
            sessions,
            clock,
            ttl,
        }
    }

    /// Returns the configured session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Checks the credentials and starts a fresh session.
    ///
    /// On success the session the caller already held, if any, is retired
    /// and expired sessions are swept from the store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username or
    /// a wrong password.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        previous: Option<SessionId>,
    ) -> AuthResult<Session> {
        let Ok(name) = Username::new(username) else {
            return Err(AuthError::InvalidCredentials);
        };
        let candidate = self.store.find_worker_by_username(&name).await?;
        let Some(worker) = candidate.filter(|found| found.check_password(password)) else {
            tracing::warn!(username = %name, "rejected login");
            return Err(AuthError::InvalidCredentials);
        };
        if let Some(stale) = previous {
            self.sessions.delete_session(stale).await?;
        }
        let purged = self.sessions.purge_expired(self.clock.utc()).await?;
        if purged > 0 {
            tracing::debug!(count = purged, "purged expired sessions");
        }
        let session = Session::start(worker.id(), self.ttl, &*self.clock);
        self.sessions.insert_session(&session).await?;
        tracing::info!(worker_id = %worker.id(), session_id = %session.id(), "logged in");
        Ok(session)
    }

    /// Resolves a session cookie to its worker.
    ///
    /// Expired sessions, and sessions whose worker was deleted, are removed
    /// and resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when a lookup fails.
    pub async fn resolve(&self, id: SessionId) -> AuthResult<Option<Authenticated>> {
        let Some(session) = self.sessions.find_session(id).await? else {
            return Ok(None);
        };
        if session.is_expired(&*self.clock) {
            tracing::debug!(session_id = %id, "dropping expired session");
            self.sessions.delete_session(id).await?;
            return Ok(None);
        }
        let Some(worker) = self.store.find_worker(session.worker_id()).await? else {
            self.sessions.delete_session(id).await?;
            return Ok(None);
        };
        Ok(Some(Authenticated { session, worker }))
    }

    /// Ends a session. Unknown sessions are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Session`] when the store fails.
    pub async fn logout(&self, id: SessionId) -> AuthResult<()> {
        self.sessions.delete_session(id).await?;
        tracing::info!(session_id = %id, "logged out");
        Ok(())
    }
}
