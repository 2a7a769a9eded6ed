//! Home page counts and the per-session visit counter.

use crate::tracker::{
    domain::SessionId,
    ports::{
        SessionStore, SessionStoreError, TaskFilter, TrackerRepositoryError, TrackerStore,
        WorkerFilter,
    },
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Entity totals plus the caller's visit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Number of workers.
    pub num_workers: u64,
    /// Number of tasks.
    pub num_tasks: u64,
    /// Number of task types.
    pub num_task_types: u64,
    /// Number of positions.
    pub num_positions: u64,
    /// Dashboard visits in the current session, this one included.
    pub num_visits: u64,
}

/// Service-level errors for the dashboard.
#[derive(Debug, Clone, Error)]
pub enum DashboardError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),
    /// Session store operation failed.
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

/// Dashboard service.
pub struct DashboardService<R: ?Sized, S: ?Sized> {
    store: Arc<R>,
    sessions: Arc<S>,
}

impl<R, S> DashboardService<R, S>
where
    R: TrackerStore + ?Sized,
    S: SessionStore + ?Sized,
{
    /// Creates a new dashboard service.
    #[must_use]
    pub const fn new(store: Arc<R>, sessions: Arc<S>) -> Self {
        Self { store, sessions }
    }

    /// Counts one visit for `session_id` and returns the entity totals.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] when a lookup fails or the session is gone.
    pub async fn visit(&self, session_id: SessionId) -> Result<Dashboard, DashboardError> {
        let num_visits = self.sessions.record_visit(session_id).await?;
        let dashboard = Dashboard {
            num_workers: self.store.count_workers(&WorkerFilter::All).await?,
            num_tasks: self.store.count_tasks(&TaskFilter::all()).await?,
            num_task_types: self.store.count_task_types(None).await?,
            num_positions: self.store.count_positions(None).await?,
            num_visits,
        };
        tracing::debug!(session_id = %session_id, num_visits, "recorded dashboard visit");
        Ok(dashboard)
    }
}
