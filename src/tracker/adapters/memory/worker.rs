//! In-memory worker repository.

use super::{InMemoryTrackerStore, TrackerState, count_of};
use crate::tracker::{
    domain::{PageWindow, Username, Worker, WorkerId, WorkerWithPosition},
    ports::{
        TrackerRepositoryError, TrackerRepositoryResult, WorkerFilter, WorkerRepository,
        contains_ignore_case,
    },
};
use async_trait::async_trait;
use std::collections::BTreeSet;

fn matches(worker: &Worker, filter: &WorkerFilter) -> bool {
    match filter {
        WorkerFilter::All => true,
        WorkerFilter::Username(term) => contains_ignore_case(worker.username().as_str(), term),
        WorkerFilter::Position(position_id) => worker.position_id() == Some(*position_id),
    }
}

fn sorted(mut workers: Vec<Worker>) -> Vec<Worker> {
    workers.sort_by(|left, right| left.username().cmp(right.username()));
    workers
}

fn with_position(state: &TrackerState, worker: Worker) -> WorkerWithPosition {
    let position = worker
        .position_id()
        .and_then(|id| state.positions.get(&id))
        .cloned();
    WorkerWithPosition { worker, position }
}

/// Rejects a username held by another worker or a dangling position.
fn check_constraints(state: &TrackerState, worker: &Worker) -> TrackerRepositoryResult<()> {
    let username_taken = state
        .workers
        .values()
        .any(|other| other.id() != worker.id() && other.username() == worker.username());
    if username_taken {
        return Err(TrackerRepositoryError::DuplicateUsername(
            worker.username().clone(),
        ));
    }
    if let Some(position_id) = worker.position_id() {
        if !state.positions.contains_key(&position_id) {
            return Err(TrackerRepositoryError::PositionNotFound(position_id));
        }
    }
    Ok(())
}

#[async_trait]
impl WorkerRepository for InMemoryTrackerStore {
    async fn insert_worker(&self, worker: &Worker) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        check_constraints(&state, worker)?;
        state.workers.insert(worker.id(), worker.clone());
        Ok(())
    }

    async fn update_worker(&self, worker: &Worker) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.workers.contains_key(&worker.id()) {
            return Err(TrackerRepositoryError::WorkerNotFound(worker.id()));
        }
        check_constraints(&state, worker)?;
        state.workers.insert(worker.id(), worker.clone());
        Ok(())
    }

    async fn delete_worker(&self, id: WorkerId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        state
            .workers
            .remove(&id)
            .ok_or(TrackerRepositoryError::WorkerNotFound(id))?;
        for task in state.tasks.values_mut() {
            task.remove_assignee(id);
        }
        Ok(())
    }

    async fn find_worker(&self, id: WorkerId) -> TrackerRepositoryResult<Option<Worker>> {
        let state = self.read()?;
        Ok(state.workers.get(&id).cloned())
    }

    async fn find_worker_with_position(
        &self,
        id: WorkerId,
    ) -> TrackerRepositoryResult<Option<WorkerWithPosition>> {
        let state = self.read()?;
        Ok(state
            .workers
            .get(&id)
            .cloned()
            .map(|worker| with_position(&state, worker)))
    }

    async fn find_worker_by_username(
        &self,
        username: &Username,
    ) -> TrackerRepositoryResult<Option<Worker>> {
        let state = self.read()?;
        Ok(state
            .workers
            .values()
            .find(|worker| worker.username() == username)
            .cloned())
    }

    async fn find_workers(&self, ids: &BTreeSet<WorkerId>) -> TrackerRepositoryResult<Vec<Worker>> {
        let state = self.read()?;
        Ok(sorted(
            ids.iter()
                .filter_map(|id| state.workers.get(id).cloned())
                .collect(),
        ))
    }

    async fn list_workers(&self) -> TrackerRepositoryResult<Vec<Worker>> {
        let state = self.read()?;
        Ok(sorted(state.workers.values().cloned().collect()))
    }

    async fn count_workers(&self, filter: &WorkerFilter) -> TrackerRepositoryResult<u64> {
        let state = self.read()?;
        let count = state
            .workers
            .values()
            .filter(|worker| matches(worker, filter))
            .count();
        Ok(count_of(count))
    }

    async fn workers_with_positions(
        &self,
        filter: &WorkerFilter,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<WorkerWithPosition>> {
        let state = self.read()?;
        let workers = sorted(
            state
                .workers
                .values()
                .filter(|worker| matches(worker, filter))
                .cloned()
                .collect(),
        );
        Ok(window
            .slice(workers)
            .into_iter()
            .map(|worker| with_position(&state, worker))
            .collect())
    }
}
