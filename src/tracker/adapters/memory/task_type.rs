//! In-memory task type repository.

use super::{InMemoryTrackerStore, count_of};
use crate::tracker::{
    domain::{PageWindow, TaskType, TaskTypeId, TaskTypeSummary},
    ports::{
        TaskTypeRepository, TrackerRepositoryError, TrackerRepositoryResult, contains_ignore_case,
    },
};
use async_trait::async_trait;

fn matches(task_type: &TaskType, name: Option<&str>) -> bool {
    name.is_none_or(|term| contains_ignore_case(task_type.name().as_str(), term))
}

fn sorted(mut task_types: Vec<TaskType>) -> Vec<TaskType> {
    task_types
        .sort_by(|left, right| left.name().cmp(right.name()).then(left.id().cmp(&right.id())));
    task_types
}

#[async_trait]
impl TaskTypeRepository for InMemoryTrackerStore {
    async fn insert_task_type(&self, task_type: &TaskType) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        state.task_types.insert(task_type.id(), task_type.clone());
        Ok(())
    }

    async fn update_task_type(&self, task_type: &TaskType) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .task_types
            .get_mut(&task_type.id())
            .ok_or(TrackerRepositoryError::TaskTypeNotFound(task_type.id()))?;
        *stored = task_type.clone();
        Ok(())
    }

    async fn delete_task_type(&self, id: TaskTypeId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.task_types.contains_key(&id) {
            return Err(TrackerRepositoryError::TaskTypeNotFound(id));
        }
        let task_count = state
            .tasks
            .values()
            .filter(|task| task.task_type_id() == id)
            .count();
        if task_count > 0 {
            return Err(TrackerRepositoryError::TaskTypeInUse {
                id,
                task_count: count_of(task_count),
            });
        }
        state.task_types.remove(&id);
        Ok(())
    }

    async fn find_task_type(&self, id: TaskTypeId) -> TrackerRepositoryResult<Option<TaskType>> {
        let state = self.read()?;
        Ok(state.task_types.get(&id).cloned())
    }

    async fn list_task_types(&self) -> TrackerRepositoryResult<Vec<TaskType>> {
        let state = self.read()?;
        Ok(sorted(state.task_types.values().cloned().collect()))
    }

    async fn count_task_types(&self, name: Option<&str>) -> TrackerRepositoryResult<u64> {
        let state = self.read()?;
        let count = state
            .task_types
            .values()
            .filter(|task_type| matches(task_type, name))
            .count();
        Ok(count_of(count))
    }

    async fn task_type_summaries(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<TaskTypeSummary>> {
        let state = self.read()?;
        let task_types = sorted(
            state
                .task_types
                .values()
                .filter(|task_type| matches(task_type, name))
                .cloned()
                .collect(),
        );
        Ok(window
            .slice(task_types)
            .into_iter()
            .map(|task_type| {
                let task_count = state
                    .tasks
                    .values()
                    .filter(|task| task.task_type_id() == task_type.id())
                    .count();
                TaskTypeSummary {
                    task_type,
                    task_count: count_of(task_count),
                }
            })
            .collect())
    }
}
