//! In-memory task repository and assignee bookkeeping.

use super::{InMemoryTrackerStore, TrackerState, count_of};
use crate::tracker::{
    domain::{
        AssignmentChange, EntityName, PageWindow, Task, TaskId, TaskStatus, WorkerId,
        deadline_order,
    },
    ports::{
        TaskFilter, TaskRepository, TrackerRepositoryError, TrackerRepositoryResult,
        contains_ignore_case,
    },
};
use async_trait::async_trait;
use std::collections::BTreeSet;

fn matches(task: &Task, filter: &TaskFilter) -> bool {
    filter
        .name
        .as_deref()
        .is_none_or(|term| contains_ignore_case(task.name().as_str(), term))
        && filter
            .task_type_id
            .is_none_or(|task_type_id| task.task_type_id() == task_type_id)
        && filter.status.is_none_or(|status| task.status() == status)
        && filter
            .assignee
            .is_none_or(|worker_id| task.is_assigned(worker_id))
}

fn check_workers_exist<'a>(
    state: &TrackerState,
    workers: impl IntoIterator<Item = &'a WorkerId>,
) -> TrackerRepositoryResult<()> {
    workers
        .into_iter()
        .find(|worker_id| !state.workers.contains_key(worker_id))
        .map_or(Ok(()), |missing| {
            Err(TrackerRepositoryError::WorkerNotFound(*missing))
        })
}

/// Applies the unique-name, task-type, and assignee constraints.
fn check_constraints(state: &TrackerState, task: &Task) -> TrackerRepositoryResult<()> {
    let name_taken = state
        .tasks
        .values()
        .any(|other| other.id() != task.id() && other.name() == task.name());
    if name_taken {
        return Err(TrackerRepositoryError::DuplicateTaskName(task.name().clone()));
    }
    if !state.task_types.contains_key(&task.task_type_id()) {
        return Err(TrackerRepositoryError::TaskTypeNotFound(task.task_type_id()));
    }
    check_workers_exist(state, task.assignees())
}

#[async_trait]
impl TaskRepository for InMemoryTrackerStore {
    async fn insert_task(&self, task: &Task) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        check_constraints(&state, task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(TrackerRepositoryError::TaskNotFound(task.id()));
        }
        check_constraints(&state, task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TrackerRepositoryError::TaskNotFound(id))
    }

    async fn find_task(&self, id: TaskId) -> TrackerRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn task_name_taken(
        &self,
        name: &EntityName,
        except: Option<TaskId>,
    ) -> TrackerRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .any(|task| task.name() == name && Some(task.id()) != except))
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> TrackerRepositoryResult<u64> {
        let state = self.read()?;
        let count = state
            .tasks
            .values()
            .filter(|task| matches(task, filter))
            .count();
        Ok(count_of(count))
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        window: Option<PageWindow>,
    ) -> TrackerRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches(task, filter))
            .cloned()
            .collect();
        tasks.sort_by(deadline_order);
        if let Some(bounds) = window {
            return Ok(bounds.slice(tasks));
        }
        Ok(tasks)
    }

    async fn set_task_status(&self, id: TaskId, status: TaskStatus) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TrackerRepositoryError::TaskNotFound(id))?;
        task.set_status(status);
        Ok(())
    }

    async fn toggle_assignee(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> TrackerRepositoryResult<AssignmentChange> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&id) {
            return Err(TrackerRepositoryError::TaskNotFound(id));
        }
        check_workers_exist(&state, [&worker_id])?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TrackerRepositoryError::TaskNotFound(id))?;
        Ok(task.toggle_assignee(worker_id))
    }

    async fn set_assignees(
        &self,
        id: TaskId,
        workers: &BTreeSet<WorkerId>,
    ) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&id) {
            return Err(TrackerRepositoryError::TaskNotFound(id));
        }
        check_workers_exist(&state, workers)?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TrackerRepositoryError::TaskNotFound(id))?;
        task.replace_assignees(workers.iter().copied());
        Ok(())
    }
}
