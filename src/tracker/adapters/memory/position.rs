//! In-memory position repository.

use super::{InMemoryTrackerStore, count_of};
use crate::tracker::{
    domain::{PageWindow, Position, PositionId, PositionSummary},
    ports::{
        PositionRepository, TrackerRepositoryError, TrackerRepositoryResult, contains_ignore_case,
    },
};
use async_trait::async_trait;

fn matches(position: &Position, name: Option<&str>) -> bool {
    name.is_none_or(|term| contains_ignore_case(position.name().as_str(), term))
}

fn sorted(mut positions: Vec<Position>) -> Vec<Position> {
    positions.sort_by(|left, right| left.name().cmp(right.name()).then(left.id().cmp(&right.id())));
    positions
}

#[async_trait]
impl PositionRepository for InMemoryTrackerStore {
    async fn insert_position(&self, position: &Position) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        state.positions.insert(position.id(), position.clone());
        Ok(())
    }

    async fn update_position(&self, position: &Position) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .positions
            .get_mut(&position.id())
            .ok_or(TrackerRepositoryError::PositionNotFound(position.id()))?;
        *stored = position.clone();
        Ok(())
    }

    async fn delete_position(&self, id: PositionId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        state
            .positions
            .remove(&id)
            .ok_or(TrackerRepositoryError::PositionNotFound(id))?;

        for worker in state.workers.values_mut() {
            if worker.position_id() == Some(id) {
                let mut profile = worker.profile();
                profile.position_id = None;
                worker.apply_profile(profile);
            }
        }
        Ok(())
    }

    async fn find_position(&self, id: PositionId) -> TrackerRepositoryResult<Option<Position>> {
        let state = self.read()?;
        Ok(state.positions.get(&id).cloned())
    }

    async fn list_positions(&self) -> TrackerRepositoryResult<Vec<Position>> {
        let state = self.read()?;
        Ok(sorted(state.positions.values().cloned().collect()))
    }

    async fn count_positions(&self, name: Option<&str>) -> TrackerRepositoryResult<u64> {
        let state = self.read()?;
        let count = state
            .positions
            .values()
            .filter(|position| matches(position, name))
            .count();
        Ok(count_of(count))
    }

    async fn position_summaries(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<PositionSummary>> {
        let state = self.read()?;
        let positions = sorted(
            state
                .positions
                .values()
                .filter(|position| matches(position, name))
                .cloned()
                .collect(),
        );
        Ok(window
            .slice(positions)
            .into_iter()
            .map(|position| {
                let worker_count = state
                    .workers
                    .values()
                    .filter(|worker| worker.position_id() == Some(position.id()))
                    .count();
                PositionSummary {
                    position,
                    worker_count: count_of(worker_count),
                }
            })
            .collect())
    }
}
