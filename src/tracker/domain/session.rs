//! Browser session records: authenticated worker plus per-session counters.

use super::{SessionId, WorkerId};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;

/// Server-side session keyed by the cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    worker_id: WorkerId,
    num_visits: u64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSessionData {
    /// Session identifier.
    pub id: SessionId,
    /// Worker the session authenticates.
    pub worker_id: WorkerId,
    /// Dashboard visits recorded in this session.
    pub num_visits: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Starts a session for a worker that expires after `ttl`.
    #[must_use]
    pub fn start(worker_id: WorkerId, ttl: Duration, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            id: SessionId::new(),
            worker_id,
            num_visits: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedSessionData) -> Self {
        Self {
            id: data.id,
            worker_id: data.worker_id,
            num_visits: data.num_visits,
            created_at: data.created_at,
            expires_at: data.expires_at,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the authenticated worker.
    #[must_use]
    pub const fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    /// Returns the number of dashboard visits recorded so far.
    #[must_use]
    pub const fn num_visits(&self) -> u64 {
        self.num_visits
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` once the expiry timestamp has passed.
    #[must_use]
    pub fn is_expired(&self, clock: &impl Clock) -> bool {
        clock.utc() >= self.expires_at
    }

    /// Counts one dashboard visit and returns the new total.
    pub const fn record_visit(&mut self) -> u64 {
        self.num_visits = self.num_visits.saturating_add(1);
        self.num_visits
    }
}
