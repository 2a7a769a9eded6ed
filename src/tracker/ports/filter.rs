//! Search filters accepted by the list queries.

use crate::tracker::domain::{PositionId, TaskStatus, TaskTypeId, WorkerId};

/// Normalizes a free-text search value: trims and drops blanks.
#[must_use]
pub fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

/// Case-insensitive substring test used by the in-memory adapters.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter for task queries. Unset fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the task name.
    pub name: Option<String>,
    /// Restrict to one task type.
    pub task_type_id: Option<TaskTypeId>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
    /// Restrict to tasks assigned to one worker.
    pub assignee: Option<WorkerId>,
}

impl TaskFilter {
    /// Matches every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to names containing `name`, ignoring case. Blank input is
    /// ignored.
    #[must_use]
    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name = search_term(name);
        self
    }

    /// Restricts to one task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type_id: Option<TaskTypeId>) -> Self {
        self.task_type_id = task_type_id;
        self
    }

    /// Restricts to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to tasks assigned to `worker_id`.
    #[must_use]
    pub const fn with_assignee(mut self, worker_id: WorkerId) -> Self {
        self.assignee = Some(worker_id);
        self
    }
}

/// Filter for worker queries.
///
/// A username search always wins over a position restriction; the two are
/// never combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkerFilter {
    /// Every worker.
    #[default]
    All,
    /// Usernames containing the term, ignoring case.
    Username(String),
    /// Workers holding the position.
    Position(PositionId),
}

impl WorkerFilter {
    /// Builds the filter from list-view inputs, applying the precedence rule.
    #[must_use]
    pub fn from_query(username: Option<&str>, position_id: Option<PositionId>) -> Self {
        if let Some(term) = search_term(username) {
            return Self::Username(term);
        }
        position_id.map_or(Self::All, Self::Position)
    }
}
