//! Task type listing and CRUD.

use super::forms::{FormErrors, NameForm};
use crate::tracker::{
    domain::{EntityName, Page, PageError, PageRequest, TaskType, TaskTypeId, TaskTypeSummary},
    ports::{TrackerRepositoryError, TrackerStore, search_term},
};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task type operations.
#[derive(Debug, Clone, Error)]
pub enum TaskTypeServiceError {
    /// The submitted form failed validation; nothing was stored.
    #[error("invalid task type form: {0}")]
    Invalid(FormErrors),
    /// The task type does not exist.
    #[error("task type not found: {0}")]
    NotFound(TaskTypeId),
    /// Tasks still reference the task type, so it was kept.
    #[error("task type {id} is still used by {task_count} task(s)")]
    InUse {
        /// The task type that was to be deleted.
        id: TaskTypeId,
        /// Number of referencing tasks.
        task_count: u64,
    },
    /// The requested page does not exist.
    #[error(transparent)]
    Page(#[from] PageError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),
}

/// Result type for task type service operations.
pub type TaskTypeServiceResult<T> = Result<T, TaskTypeServiceError>;

/// Task type orchestration service.
pub struct TaskTypeService<R: ?Sized> {
    store: Arc<R>,
}

impl<R> TaskTypeService<R>
where
    R: TrackerStore + ?Sized,
{
    /// Creates a new task type service.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Returns one page of task types whose name contains `name`, each with
    /// its task count.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTypeServiceError::Page`] for a page past the end.
    pub async fn list(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> TaskTypeServiceResult<Page<TaskTypeSummary>> {
        let term = search_term(name);
        let total = self.store.count_task_types(term.as_deref()).await?;
        let window = page.window(total)?;
        let rows = self
            .store
            .task_type_summaries(term.as_deref(), window)
            .await?;
        Ok(Page::new(rows, window))
    }

    /// Finds a task type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTypeServiceError::NotFound`] when it does not exist.
    pub async fn find(&self, id: TaskTypeId) -> TaskTypeServiceResult<TaskType> {
        self.store
            .find_task_type(id)
            .await?
            .ok_or(TaskTypeServiceError::NotFound(id))
    }

    /// Validates and stores a new task type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTypeServiceError::Invalid`] when the name is rejected.
    pub async fn create(&self, form: &NameForm) -> TaskTypeServiceResult<TaskType> {
        let task_type = TaskType::new(validate_name(form)?);
        self.store.insert_task_type(&task_type).await?;
        tracing::info!(
            task_type_id = %task_type.id(),
            name = %task_type.name(),
            "created task type"
        );
        Ok(task_type)
    }

    /// Validates and applies a rename.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTypeServiceError::NotFound`] or
    /// [`TaskTypeServiceError::Invalid`].
    pub async fn update(&self, id: TaskTypeId, form: &NameForm) -> TaskTypeServiceResult<TaskType> {
        let mut task_type = self.find(id).await?;
        task_type.rename(validate_name(form)?);
        self.store
            .update_task_type(&task_type)
            .await
            .map_err(classify)?;
        tracing::info!(task_type_id = %id, "renamed task type");
        Ok(task_type)
    }

    /// Deletes a task type that no task references.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTypeServiceError::InUse`] when tasks still reference it
    /// or [`TaskTypeServiceError::NotFound`] when it does not exist.
    pub async fn delete(&self, id: TaskTypeId) -> TaskTypeServiceResult<()> {
        self.store.delete_task_type(id).await.map_err(classify)?;
        tracing::info!(task_type_id = %id, "deleted task type");
        Ok(())
    }
}

fn validate_name(form: &NameForm) -> TaskTypeServiceResult<EntityName> {
    EntityName::new(form.name.as_str())
        .map_err(|err| TaskTypeServiceError::Invalid(FormErrors::single("name", err.to_string())))
}

fn classify(err: TrackerRepositoryError) -> TaskTypeServiceError {
    match err {
        TrackerRepositoryError::TaskTypeNotFound(id) => TaskTypeServiceError::NotFound(id),
        TrackerRepositoryError::TaskTypeInUse { id, task_count } => {
            tracing::warn!(task_type_id = %id, task_count, "refused to delete task type in use");
            TaskTypeServiceError::InUse { id, task_count }
        }
        other => other.into(),
    }
}
