//! Repository ports for tracker persistence.
//!
//! Each aggregate has its own trait with entity-prefixed method names so a
//! single adapter can implement all of them and be used through
//! [`TrackerStore`] without ambiguity. Every mutating method is expected to
//! run as one storage transaction.

use super::{TaskFilter, WorkerFilter};
use crate::tracker::domain::{
    AssignmentChange, EntityName, PageWindow, Position, PositionId, PositionSummary, Task, TaskId,
    TaskStatus, TaskType, TaskTypeId, TaskTypeSummary, Username, Worker, WorkerId,
    WorkerWithPosition,
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tracker repository operations.
pub type TrackerRepositoryResult<T> = Result<T, TrackerRepositoryError>;

/// Position persistence contract.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Stores a new position.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::Persistence`] on storage failure.
    async fn insert_position(&self, position: &Position) -> TrackerRepositoryResult<()>;

    /// Persists a renamed position.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::PositionNotFound`] when the position
    /// does not exist.
    async fn update_position(&self, position: &Position) -> TrackerRepositoryResult<()>;

    /// Deletes a position. Workers holding it keep existing with no position.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::PositionNotFound`] when the position
    /// does not exist.
    async fn delete_position(&self, id: PositionId) -> TrackerRepositoryResult<()>;

    /// Finds a position by identifier.
    async fn find_position(&self, id: PositionId) -> TrackerRepositoryResult<Option<Position>>;

    /// Returns every position ordered by name.
    async fn list_positions(&self) -> TrackerRepositoryResult<Vec<Position>>;

    /// Counts positions whose name contains `name` (all when `None`).
    async fn count_positions(&self, name: Option<&str>) -> TrackerRepositoryResult<u64>;

    /// Returns positions whose name contains `name`, ordered by name and
    /// annotated with their worker counts.
    async fn position_summaries(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<PositionSummary>>;
}

/// Task type persistence contract.
#[async_trait]
pub trait TaskTypeRepository: Send + Sync {
    /// Stores a new task type.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::Persistence`] on storage failure.
    async fn insert_task_type(&self, task_type: &TaskType) -> TrackerRepositoryResult<()>;

    /// Persists a renamed task type.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskTypeNotFound`] when the task type
    /// does not exist.
    async fn update_task_type(&self, task_type: &TaskType) -> TrackerRepositoryResult<()>;

    /// Deletes a task type that no task references.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskTypeNotFound`] when missing or
    /// [`TrackerRepositoryError::TaskTypeInUse`] when tasks still reference
    /// it; nothing is deleted in that case.
    async fn delete_task_type(&self, id: TaskTypeId) -> TrackerRepositoryResult<()>;

    /// Finds a task type by identifier.
    async fn find_task_type(&self, id: TaskTypeId) -> TrackerRepositoryResult<Option<TaskType>>;

    /// Returns every task type ordered by name.
    async fn list_task_types(&self) -> TrackerRepositoryResult<Vec<TaskType>>;

    /// Counts task types whose name contains `name` (all when `None`).
    async fn count_task_types(&self, name: Option<&str>) -> TrackerRepositoryResult<u64>;

    /// Returns task types whose name contains `name`, ordered by name and
    /// annotated with their task counts.
    async fn task_type_summaries(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<TaskTypeSummary>>;
}

/// Worker persistence contract.
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// Stores a new worker.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::DuplicateUsername`] when the
    /// username is taken or [`TrackerRepositoryError::PositionNotFound`] when
    /// the referenced position does not exist.
    async fn insert_worker(&self, worker: &Worker) -> TrackerRepositoryResult<()>;

    /// Persists profile changes of an existing worker.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::WorkerNotFound`],
    /// [`TrackerRepositoryError::DuplicateUsername`], or
    /// [`TrackerRepositoryError::PositionNotFound`].
    async fn update_worker(&self, worker: &Worker) -> TrackerRepositoryResult<()>;

    /// Deletes a worker and drops all of their task assignments.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::WorkerNotFound`] when missing.
    async fn delete_worker(&self, id: WorkerId) -> TrackerRepositoryResult<()>;

    /// Finds a worker by identifier.
    async fn find_worker(&self, id: WorkerId) -> TrackerRepositoryResult<Option<Worker>>;

    /// Finds a worker joined with its position.
    async fn find_worker_with_position(
        &self,
        id: WorkerId,
    ) -> TrackerRepositoryResult<Option<WorkerWithPosition>>;

    /// Finds a worker by exact username.
    async fn find_worker_by_username(
        &self,
        username: &Username,
    ) -> TrackerRepositoryResult<Option<Worker>>;

    /// Returns the workers among `ids` that exist.
    async fn find_workers(&self, ids: &BTreeSet<WorkerId>) -> TrackerRepositoryResult<Vec<Worker>>;

    /// Returns every worker ordered by username.
    async fn list_workers(&self) -> TrackerRepositoryResult<Vec<Worker>>;

    /// Counts workers matching the filter.
    async fn count_workers(&self, filter: &WorkerFilter) -> TrackerRepositoryResult<u64>;

    /// Returns matching workers, ordered by username, each with its position.
    async fn workers_with_positions(
        &self,
        filter: &WorkerFilter,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<WorkerWithPosition>>;
}

/// Task persistence contract, including the assignee join table.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and its assignees.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::DuplicateTaskName`],
    /// [`TrackerRepositoryError::TaskTypeNotFound`], or
    /// [`TrackerRepositoryError::WorkerNotFound`] for a dangling assignee.
    async fn insert_task(&self, task: &Task) -> TrackerRepositoryResult<()>;

    /// Persists every field of an existing task, replacing its assignees.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskNotFound`] plus the errors of
    /// [`TaskRepository::insert_task`].
    async fn update_task(&self, task: &Task) -> TrackerRepositoryResult<()>;

    /// Deletes a task and its assignments.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskNotFound`] when missing.
    async fn delete_task(&self, id: TaskId) -> TrackerRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> TrackerRepositoryResult<Option<Task>>;

    /// Returns `true` when another task already uses `name`.
    async fn task_name_taken(
        &self,
        name: &EntityName,
        except: Option<TaskId>,
    ) -> TrackerRepositoryResult<bool>;

    /// Counts tasks matching the filter.
    async fn count_tasks(&self, filter: &TaskFilter) -> TrackerRepositoryResult<u64>;

    /// Returns matching tasks ordered by deadline, optionally windowed.
    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        window: Option<PageWindow>,
    ) -> TrackerRepositoryResult<Vec<Task>>;

    /// Sets the status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskNotFound`] when missing.
    async fn set_task_status(&self, id: TaskId, status: TaskStatus) -> TrackerRepositoryResult<()>;

    /// Adds the worker to the task's assignees, or removes them if already
    /// assigned, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskNotFound`] or
    /// [`TrackerRepositoryError::WorkerNotFound`].
    async fn toggle_assignee(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> TrackerRepositoryResult<AssignmentChange>;

    /// Replaces the task's assignee set with exactly `workers`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::TaskNotFound`] or
    /// [`TrackerRepositoryError::WorkerNotFound`]; on error no assignment
    /// changes.
    async fn set_assignees(
        &self,
        id: TaskId,
        workers: &BTreeSet<WorkerId>,
    ) -> TrackerRepositoryResult<()>;
}

/// Everything the tracker services need from storage.
pub trait TrackerStore:
    PositionRepository + TaskTypeRepository + WorkerRepository + TaskRepository
{
}

impl<T> TrackerStore for T where
    T: PositionRepository + TaskTypeRepository + WorkerRepository + TaskRepository + ?Sized
{
}

/// Errors returned by tracker repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TrackerRepositoryError {
    /// Another task already uses the name.
    #[error("duplicate task name: {0}")]
    DuplicateTaskName(EntityName),

    /// Another worker already uses the username.
    #[error("duplicate username: {0}")]
    DuplicateUsername(Username),

    /// The position was not found.
    #[error("position not found: {0}")]
    PositionNotFound(PositionId),

    /// The task type was not found.
    #[error("task type not found: {0}")]
    TaskTypeNotFound(TaskTypeId),

    /// The worker was not found.
    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task type is still referenced by tasks and cannot be deleted.
    #[error("task type {id} is still used by {task_count} task(s)")]
    TaskTypeInUse {
        /// The task type that was to be deleted.
        id: TaskTypeId,
        /// Number of tasks referencing it.
        task_count: u64,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TrackerRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for the "entity does not exist" variants.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PositionNotFound(_)
                | Self::TaskTypeNotFound(_)
                | Self::WorkerNotFound(_)
                | Self::TaskNotFound(_)
        )
    }
}
