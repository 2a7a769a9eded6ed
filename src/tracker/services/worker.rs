//! Worker listing, detail, and account forms.

use super::forms::{Choice, FormErrors, REQUIRED_MESSAGE, non_blank};
use crate::tracker::{
    domain::{
        Page, PageError, PageRequest, PasswordHash, PersonName, PositionId, Username, Worker,
        WorkerId, WorkerProfile, WorkerTaskGroups, WorkerWithPosition, password_policy_violations,
    },
    ports::{TaskFilter, TrackerRepositoryError, TrackerStore, WorkerFilter},
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";
const PASSWORD_MISMATCH_MESSAGE: &str = "The two password fields didn't match.";
const UNKNOWN_POSITION_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Editable worker profile as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerForm {
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Position identifier; blank for none.
    pub position: String,
}

impl WorkerForm {
    /// Prefills the form from a stored worker.
    #[must_use]
    pub fn from_worker(worker: &Worker) -> Self {
        Self {
            username: worker.username().as_str().to_owned(),
            first_name: worker.first_name().as_str().to_owned(),
            last_name: worker.last_name().as_str().to_owned(),
            position: worker
                .position_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Account creation form. Passwords are never echoed back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerCreateForm {
    /// Profile fields.
    #[serde(flatten)]
    pub profile: WorkerForm,
    /// Password.
    #[serde(skip)]
    pub password1: String,
    /// Password confirmation.
    #[serde(skip)]
    pub password2: String,
}

/// Worker with their tasks split by completion.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerDetail {
    /// The worker and their position.
    pub worker: WorkerWithPosition,
    /// Display string `first last (position)`.
    pub display: String,
    /// Assigned tasks.
    #[serde(flatten)]
    pub tasks: WorkerTaskGroups,
}

/// Service-level errors for worker operations.
#[derive(Debug, Clone, Error)]
pub enum WorkerServiceError {
    /// The submitted form failed validation; nothing was stored.
    #[error("invalid worker form: {0}")]
    Invalid(FormErrors),
    /// The worker does not exist.
    #[error("worker not found: {0}")]
    NotFound(WorkerId),
    /// The requested page does not exist.
    #[error(transparent)]
    Page(#[from] PageError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),
}

/// Result type for worker service operations.
pub type WorkerServiceResult<T> = Result<T, WorkerServiceError>;

/// Worker orchestration service.
pub struct WorkerService<R: ?Sized> {
    store: Arc<R>,
}

impl<R> WorkerService<R>
where
    R: TrackerStore + ?Sized,
{
    /// Creates a new worker service.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Returns one page of workers matching the filter, in username order,
    /// each with its position.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::Page`] for a page past the end.
    pub async fn list(
        &self,
        filter: &WorkerFilter,
        page: PageRequest,
    ) -> WorkerServiceResult<Page<WorkerWithPosition>> {
        let window = page.window(self.store.count_workers(filter).await?)?;
        let workers = self.store.workers_with_positions(filter, window).await?;
        tracing::debug!(?filter, page = window.number, "listed workers");
        Ok(Page::new(workers, window))
    }

    /// Finds a worker.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::NotFound`] when the worker does not exist.
    pub async fn find(&self, id: WorkerId) -> WorkerServiceResult<Worker> {
        self.store
            .find_worker(id)
            .await?
            .ok_or(WorkerServiceError::NotFound(id))
    }

    /// Loads a worker with their position and grouped tasks.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::NotFound`] when the worker does not exist.
    pub async fn detail(&self, id: WorkerId) -> WorkerServiceResult<WorkerDetail> {
        let worker = self
            .store
            .find_worker_with_position(id)
            .await?
            .ok_or(WorkerServiceError::NotFound(id))?;
        let tasks = self
            .store
            .list_tasks(&TaskFilter::all().with_assignee(id), None)
            .await?;
        Ok(WorkerDetail {
            display: worker.to_string(),
            worker,
            tasks: WorkerTaskGroups::group(tasks),
        })
    }

    /// Lists positions for the form's position field.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::Repository`] when the lookup fails.
    pub async fn position_choices(&self) -> WorkerServiceResult<Vec<Choice>> {
        Ok(self
            .store
            .list_positions()
            .await?
            .iter()
            .map(|position| Choice::new(position.id().to_string(), position.name().as_str()))
            .collect())
    }

    /// Validates and stores a new worker account.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::Invalid`] with every field error when
    /// the form is rejected.
    pub async fn create(&self, form: &WorkerCreateForm) -> WorkerServiceResult<Worker> {
        let mut errors = FormErrors::new();
        let validated = self.validate_profile(&form.profile, None, &mut errors).await?;
        let hashed = validate_passwords(form, &mut errors);
        let (Some(profile), Some(password)) = (validated, hashed) else {
            return Err(WorkerServiceError::Invalid(errors));
        };
        let worker = errors
            .finish(Worker::new(profile, password))
            .map_err(WorkerServiceError::Invalid)?;
        self.store
            .insert_worker(&worker)
            .await
            .map_err(constraint_to_form_error)?;
        tracing::info!(worker_id = %worker.id(), username = %worker.username(), "created worker");
        Ok(worker)
    }

    /// Validates and applies a profile edit. The password is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::NotFound`] for an unknown worker or
    /// [`WorkerServiceError::Invalid`] when the form is rejected.
    pub async fn update(&self, id: WorkerId, form: &WorkerForm) -> WorkerServiceResult<Worker> {
        let mut worker = self.find(id).await?;
        let mut errors = FormErrors::new();
        let validated = self.validate_profile(form, Some(id), &mut errors).await?;
        let profile = match validated {
            Some(valid) if errors.is_empty() => valid,
            _ => return Err(WorkerServiceError::Invalid(errors)),
        };
        worker.apply_profile(profile);
        self.store
            .update_worker(&worker)
            .await
            .map_err(constraint_to_form_error)?;
        tracing::info!(worker_id = %id, "updated worker");
        Ok(worker)
    }

    /// Deletes a worker together with their assignments and sessions.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerServiceError::NotFound`] when the worker does not exist.
    pub async fn delete(&self, id: WorkerId) -> WorkerServiceResult<()> {
        self.store.delete_worker(id).await.map_err(|err| match err {
            TrackerRepositoryError::WorkerNotFound(missing) => {
                WorkerServiceError::NotFound(missing)
            }
            other => other.into(),
        })?;
        tracing::info!(worker_id = %id, "deleted worker");
        Ok(())
    }

    async fn validate_profile(
        &self,
        form: &WorkerForm,
        existing: Option<WorkerId>,
        errors: &mut FormErrors,
    ) -> WorkerServiceResult<Option<WorkerProfile>> {
        let checked_username = errors.check("username", Username::new(form.username.as_str()));
        if let Some(candidate) = &checked_username {
            let holder = self.store.find_worker_by_username(candidate).await?;
            if holder.is_some_and(|other| Some(other.id()) != existing) {
                errors.add("username", DUPLICATE_USERNAME_MESSAGE);
            }
        }
        let checked_first = errors.check("first_name", PersonName::new(form.first_name.as_str()));
        let checked_last = errors.check("last_name", PersonName::new(form.last_name.as_str()));
        let checked_position = self.resolve_position(&form.position, errors).await?;

        let (Some(username), Some(first_name), Some(last_name), Some(position_id)) =
            (checked_username, checked_first, checked_last, checked_position)
        else {
            return Ok(None);
        };
        Ok(Some(WorkerProfile {
            username,
            first_name,
            last_name,
            position_id,
        }))
    }

    /// Resolves the optional position field; the outer `None` means invalid.
    async fn resolve_position(
        &self,
        raw: &str,
        errors: &mut FormErrors,
    ) -> WorkerServiceResult<Option<Option<PositionId>>> {
        let Some(value) = non_blank(raw) else {
            return Ok(Some(None));
        };
        let Ok(id) = PositionId::from_str(value) else {
            errors.add("position", UNKNOWN_POSITION_MESSAGE);
            return Ok(None);
        };
        if self.store.find_position(id).await?.is_none() {
            errors.add("position", UNKNOWN_POSITION_MESSAGE);
            return Ok(None);
        }
        Ok(Some(Some(id)))
    }
}

fn validate_passwords(form: &WorkerCreateForm, errors: &mut FormErrors) -> Option<PasswordHash> {
    if form.password1.is_empty() {
        errors.add("password1", REQUIRED_MESSAGE);
    }
    if form.password2.is_empty() {
        errors.add("password2", REQUIRED_MESSAGE);
    }
    if errors.has("password1") || errors.has("password2") {
        return None;
    }
    if form.password1 != form.password2 {
        errors.add("password2", PASSWORD_MISMATCH_MESSAGE);
        return None;
    }
    let violations = password_policy_violations(&form.password2, form.profile.username.trim());
    if !violations.is_empty() {
        for violation in violations {
            errors.add("password2", violation.to_string());
        }
        return None;
    }
    Some(PasswordHash::derive(&form.password1))
}

fn constraint_to_form_error(err: TrackerRepositoryError) -> WorkerServiceError {
    match err {
        TrackerRepositoryError::DuplicateUsername(_) => {
            WorkerServiceError::Invalid(FormErrors::single("username", DUPLICATE_USERNAME_MESSAGE))
        }
        TrackerRepositoryError::PositionNotFound(_) => {
            WorkerServiceError::Invalid(FormErrors::single("position", UNKNOWN_POSITION_MESSAGE))
        }
        TrackerRepositoryError::WorkerNotFound(id) => WorkerServiceError::NotFound(id),
        other => WorkerServiceError::Repository(other),
    }
}
