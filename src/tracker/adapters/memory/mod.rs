//! In-memory adapters for tracker tests and database-less runs.
//!
//! All four repositories share one state behind a single lock so every
//! mutation, including cross-entity effects such as clearing a deleted
//! position from its workers, is applied atomically.

mod position;
mod session;
mod task;
mod task_type;
mod worker;

pub use session::InMemorySessionStore;

use crate::tracker::{
    domain::{Position, PositionId, Task, TaskId, TaskType, TaskTypeId, Worker, WorkerId},
    ports::{TrackerRepositoryError, TrackerRepositoryResult},
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory tracker store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackerStore {
    state: Arc<RwLock<TrackerState>>,
}

#[derive(Debug, Default)]
struct TrackerState {
    positions: HashMap<PositionId, Position>,
    task_types: HashMap<TaskTypeId, TaskType>,
    workers: HashMap<WorkerId, Worker>,
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTrackerStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TrackerRepositoryResult<RwLockReadGuard<'_, TrackerState>> {
        self.state.read().map_err(|err| {
            TrackerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TrackerRepositoryResult<RwLockWriteGuard<'_, TrackerState>> {
        self.state.write().map_err(|err| {
            TrackerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Converts an in-memory count to the port's `u64`.
fn count_of(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
