//! Task board, task CRUD, status changes, and assignee management.

use super::forms::{
    Choice, FormErrors, REQUIRED_MESSAGE, checkbox_checked, invalid_choice_message, non_blank,
};
use crate::tracker::{
    domain::{
        AssignmentChange, EntityName, Page, PageError, PageRequest, StatusBoard, Task,
        TaskDetails, TaskId, TaskPriority, TaskStatus, TaskType, TaskTypeId, Worker, WorkerId,
    },
    ports::{TaskFilter, TrackerRepositoryError, TrackerStore},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

const DUPLICATE_NAME_MESSAGE: &str = "Task with this Name already exists.";
const INVALID_DEADLINE_MESSAGE: &str = "Enter a valid date/time.";
const UNKNOWN_TASK_TYPE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Title shown for a status key outside the fixed set.
pub const UNKNOWN_STATUS_TITLE: &str = "Tasks";

/// Raw task form submission, echoed back on validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskForm {
    /// Task name.
    pub name: String,
    /// Description, may be blank.
    pub description: String,
    /// Deadline in RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, or `YYYY-MM-DD`.
    pub deadline: String,
    /// Completion checkbox.
    pub is_completed: bool,
    /// Priority key; blank selects the default.
    pub priority: String,
    /// Status key; blank selects the default.
    pub status: String,
    /// Task type identifier.
    pub task_type: String,
    /// Assigned worker identifiers.
    pub assignees: Vec<String>,
}

impl TaskForm {
    /// Prefills the form from a stored task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name().as_str().to_owned(),
            description: task.description().to_owned(),
            deadline: task.deadline().format("%Y-%m-%dT%H:%M").to_string(),
            is_completed: task.is_completed(),
            priority: task.priority().as_str().to_owned(),
            status: task.status().as_str().to_owned(),
            task_type: task.task_type_id().to_string(),
            assignees: task.assignees().iter().map(ToString::to_string).collect(),
        }
    }

    /// Sets the completion flag from a checkbox value.
    #[must_use]
    pub fn with_completed_checkbox(mut self, raw: Option<&str>) -> Self {
        self.is_completed = checkbox_checked(raw);
        self
    }
}

/// Choice lists a task form needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFormChoices {
    /// Every task type.
    pub task_types: Vec<Choice>,
    /// Every worker.
    pub workers: Vec<Choice>,
    /// Every status.
    pub statuses: Vec<Choice>,
    /// Every priority.
    pub priorities: Vec<Choice>,
}

/// Task with its resolved task type and assignees.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    /// The task.
    pub task: Task,
    /// Its task type.
    pub task_type: Option<TaskType>,
    /// Assigned workers in username order.
    pub assignees: Vec<Worker>,
}

/// Task row annotated for deadline display.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledTask {
    /// The task.
    #[serde(flatten)]
    pub task: Task,
    /// Deadline passed and task not finished.
    pub is_overdue: bool,
}

/// Paginated single-status list.
#[derive(Debug, Clone, Serialize)]
pub struct StatusListing {
    /// Requested status key.
    pub key: String,
    /// Column title.
    pub title: &'static str,
    /// Current time used for the overdue flags.
    pub now: DateTime<Utc>,
    /// Tasks in the requested status.
    pub page: Page<ScheduledTask>,
}

/// Current assignees and every candidate worker for a task.
#[derive(Debug, Clone, Serialize)]
pub struct AssigneeSelection {
    /// The task.
    pub task: Task,
    /// Every worker in username order.
    pub workers: Vec<Worker>,
    /// Currently assigned workers.
    pub selected: BTreeSet<WorkerId>,
}

/// Service-level errors for task operations.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// The submitted form failed validation; nothing was stored.
    #[error("invalid task form: {0}")]
    Invalid(FormErrors),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The requested page does not exist.
    #[error(transparent)]
    Page(#[from] PageError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task orchestration service.
pub struct TaskService<R: ?Sized, C> {
    store: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskService<R, C>
where
    R: TrackerStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<R>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Returns the filtered tasks split into the four status columns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn board(&self, filter: &TaskFilter) -> TaskServiceResult<StatusBoard> {
        let tasks = self.store.list_tasks(filter, None).await?;
        tracing::debug!(count = tasks.len(), "loaded task board");
        Ok(StatusBoard::partition(tasks))
    }

    /// Returns one page of tasks in the status named by `key`.
    ///
    /// An unrecognized key yields an empty page rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Page`] for a page past the end.
    pub async fn status_listing(
        &self,
        key: &str,
        page: PageRequest,
    ) -> TaskServiceResult<StatusListing> {
        let now = self.clock.utc();
        let Ok(status) = TaskStatus::try_from(key) else {
            return Ok(StatusListing {
                key: key.to_owned(),
                title: UNKNOWN_STATUS_TITLE,
                now,
                page: Page::empty(),
            });
        };
        let filter = TaskFilter::all().with_status(status);
        let window = page.window(self.store.count_tasks(&filter).await?)?;
        let tasks = self.store.list_tasks(&filter, Some(window)).await?;
        Ok(StatusListing {
            key: key.to_owned(),
            title: status.title(),
            now,
            page: Page::new(tasks, window).map(|task| ScheduledTask {
                is_overdue: task.is_overdue(now),
                task,
            }),
        })
    }

    /// Finds a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn find(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Loads a task with its task type and assignees.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn detail(&self, id: TaskId) -> TaskServiceResult<TaskDetail> {
        let task = self.find(id).await?;
        let task_type = self.store.find_task_type(task.task_type_id()).await?;
        let assignees = self.store.find_workers(task.assignees()).await?;
        Ok(TaskDetail {
            task,
            task_type,
            assignees,
        })
    }

    /// Lists the options for the task form's choice fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn form_choices(&self) -> TaskServiceResult<TaskFormChoices> {
        let task_types = self.store.list_task_types().await?;
        let workers = self.store.list_workers().await?;
        Ok(TaskFormChoices {
            task_types: task_types
                .iter()
                .map(|task_type| Choice::new(task_type.id().to_string(), task_type.name().as_str()))
                .collect(),
            workers: workers
                .iter()
                .map(|worker| Choice::new(worker.id().to_string(), worker.username().as_str()))
                .collect(),
            statuses: TaskStatus::ALL
                .iter()
                .map(|status| Choice::new(status.as_str(), status.title()))
                .collect(),
            priorities: TaskPriority::ALL
                .iter()
                .map(|priority| Choice::new(priority.as_str(), priority.to_string()))
                .collect(),
        })
    }

    /// Validates and stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Invalid`] with every field error when the
    /// form is rejected.
    pub async fn create(&self, form: &TaskForm) -> TaskServiceResult<Task> {
        let details = self.validate(form, None).await?;
        let task = Task::new(details);
        self.store
            .insert_task(&task)
            .await
            .map_err(constraint_to_form_error)?;
        tracing::info!(task_id = %task.id(), name = %task.name(), "created task");
        Ok(task)
    }

    /// Validates and applies an edit to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for an unknown task or
    /// [`TaskServiceError::Invalid`] when the form is rejected.
    pub async fn update(&self, id: TaskId, form: &TaskForm) -> TaskServiceResult<Task> {
        let mut task = self.find(id).await?;
        let details = self.validate(form, Some(id)).await?;
        task.revise(details);
        self.store
            .update_task(&task)
            .await
            .map_err(constraint_to_form_error)?;
        tracing::info!(task_id = %id, "updated task");
        Ok(task)
    }

    /// Deletes a task and its assignments.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn delete(&self, id: TaskId) -> TaskServiceResult<()> {
        self.store.delete_task(id).await.map_err(|err| match err {
            TrackerRepositoryError::TaskNotFound(missing) => TaskServiceError::NotFound(missing),
            other => other.into(),
        })?;
        tracing::info!(task_id = %id, "deleted task");
        Ok(())
    }

    /// Applies `raw` as the task's status when it names a known status.
    ///
    /// Returns the applied status, or `None` when the value was ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn set_status(
        &self,
        id: TaskId,
        raw: Option<&str>,
    ) -> TaskServiceResult<Option<TaskStatus>> {
        let task = self.find(id).await?;
        let Some(status) = raw.and_then(|value| TaskStatus::try_from(value.trim()).ok()) else {
            tracing::debug!(task_id = %id, status = ?raw, "ignored unknown task status");
            return Ok(None);
        };
        if task.status() != status {
            self.store.set_task_status(id, status).await?;
            tracing::info!(task_id = %id, %status, "changed task status");
        }
        Ok(Some(status))
    }

    /// Assigns the worker to the task, or unassigns them if already assigned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn toggle_assignment(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> TaskServiceResult<AssignmentChange> {
        let change = self
            .store
            .toggle_assignee(id, worker_id)
            .await
            .map_err(|err| match err {
                TrackerRepositoryError::TaskNotFound(missing) => {
                    TaskServiceError::NotFound(missing)
                }
                other => other.into(),
            })?;
        tracing::info!(task_id = %id, worker_id = %worker_id, ?change, "toggled assignment");
        Ok(change)
    }

    /// Loads the current assignees and every candidate worker.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn assignee_selection(&self, id: TaskId) -> TaskServiceResult<AssigneeSelection> {
        let task = self.find(id).await?;
        let workers = self.store.list_workers().await?;
        let selected = task.assignees().clone();
        Ok(AssigneeSelection {
            task,
            workers,
            selected,
        })
    }

    /// Replaces the task's assignees with exactly the submitted workers.
    ///
    /// Duplicate identifiers collapse.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for an unknown task or
    /// [`TaskServiceError::Invalid`] when any identifier names no worker.
    pub async fn set_assignees(
        &self,
        id: TaskId,
        raw: &[String],
    ) -> TaskServiceResult<BTreeSet<WorkerId>> {
        self.find(id).await?;
        let mut errors = FormErrors::new();
        let resolved = self.resolve_workers("users", raw, &mut errors).await?;
        let workers = errors.finish(resolved).map_err(TaskServiceError::Invalid)?;
        self.store
            .set_assignees(id, &workers)
            .await
            .map_err(|err| match err {
                TrackerRepositoryError::TaskNotFound(missing) => {
                    TaskServiceError::NotFound(missing)
                }
                TrackerRepositoryError::WorkerNotFound(unknown) => TaskServiceError::Invalid(
                    FormErrors::single("users", invalid_choice_message(&unknown.to_string())),
                ),
                other => other.into(),
            })?;
        tracing::info!(task_id = %id, count = workers.len(), "replaced task assignees");
        Ok(workers)
    }

    async fn validate(
        &self,
        form: &TaskForm,
        existing: Option<TaskId>,
    ) -> TaskServiceResult<TaskDetails> {
        let mut errors = FormErrors::new();

        let checked_name = errors.check("name", EntityName::new(form.name.as_str()));
        if let Some(candidate) = &checked_name {
            if self.store.task_name_taken(candidate, existing).await? {
                errors.add("name", DUPLICATE_NAME_MESSAGE);
            }
        }

        let checked_deadline = match non_blank(&form.deadline) {
            Some(raw) => errors.check("deadline", parse_deadline(raw)),
            None => {
                errors.add("deadline", REQUIRED_MESSAGE);
                None
            }
        };

        let checked_priority =
            non_blank(&form.priority).map_or(Some(TaskPriority::default()), |raw| {
                errors.check(
                    "priority",
                    TaskPriority::try_from(raw).map_err(|_| invalid_choice_message(raw)),
                )
            });
        let checked_status = non_blank(&form.status).map_or(Some(TaskStatus::default()), |raw| {
            errors.check(
                "status",
                TaskStatus::try_from(raw).map_err(|_| invalid_choice_message(raw)),
            )
        });

        let checked_task_type = self.resolve_task_type(&form.task_type, &mut errors).await?;
        let assignees = self
            .resolve_workers("assignees", &form.assignees, &mut errors)
            .await?;

        let (Some(name), Some(deadline), Some(priority), Some(status), Some(task_type_id)) =
            (checked_name, checked_deadline, checked_priority, checked_status, checked_task_type)
        else {
            return Err(TaskServiceError::Invalid(errors));
        };
        let details = TaskDetails::new(name, deadline, task_type_id)
            .with_description(form.description.trim())
            .with_completed(form.is_completed)
            .with_priority(priority)
            .with_status(status)
            .with_assignees(assignees);
        errors.finish(details).map_err(TaskServiceError::Invalid)
    }

    async fn resolve_task_type(
        &self,
        raw: &str,
        errors: &mut FormErrors,
    ) -> TaskServiceResult<Option<TaskTypeId>> {
        let Some(value) = non_blank(raw) else {
            errors.add("task_type", REQUIRED_MESSAGE);
            return Ok(None);
        };
        let Ok(id) = TaskTypeId::from_str(value) else {
            errors.add("task_type", UNKNOWN_TASK_TYPE_MESSAGE);
            return Ok(None);
        };
        if self.store.find_task_type(id).await?.is_none() {
            errors.add("task_type", UNKNOWN_TASK_TYPE_MESSAGE);
            return Ok(None);
        }
        Ok(Some(id))
    }

    /// Parses worker identifiers, recording every unknown one under `field`.
    async fn resolve_workers(
        &self,
        field: &str,
        raw: &[String],
        errors: &mut FormErrors,
    ) -> TaskServiceResult<BTreeSet<WorkerId>> {
        let mut ids = BTreeSet::new();
        for value in raw.iter().filter_map(|value| non_blank(value)) {
            match WorkerId::from_str(value) {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(_) => errors.add(field, invalid_choice_message(value)),
            }
        }
        if ids.is_empty() {
            return Ok(ids);
        }
        let found: BTreeSet<WorkerId> = self
            .store
            .find_workers(&ids)
            .await?
            .iter()
            .map(Worker::id)
            .collect();
        for missing in ids.difference(&found) {
            errors.add(field, invalid_choice_message(&missing.to_string()));
        }
        Ok(ids)
    }
}

/// Turns constraint violations caught by storage into form errors.
fn constraint_to_form_error(err: TrackerRepositoryError) -> TaskServiceError {
    match err {
        TrackerRepositoryError::DuplicateTaskName(_) => {
            TaskServiceError::Invalid(FormErrors::single("name", DUPLICATE_NAME_MESSAGE))
        }
        TrackerRepositoryError::TaskTypeNotFound(_) => {
            TaskServiceError::Invalid(FormErrors::single("task_type", UNKNOWN_TASK_TYPE_MESSAGE))
        }
        TrackerRepositoryError::WorkerNotFound(id) => TaskServiceError::Invalid(
            FormErrors::single("assignees", invalid_choice_message(&id.to_string())),
        ),
        TrackerRepositoryError::TaskNotFound(id) => TaskServiceError::NotFound(id),
        other => TaskServiceError::Repository(other),
    }
}

/// Parses a submitted deadline as UTC.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]` (a space may replace
/// the `T`), and bare dates, which mean midnight.
///
/// # Errors
///
/// Returns a user-facing message when no format matches.
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, &'static str> {
    let value = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or(INVALID_DEADLINE_MESSAGE)
}
