//! Task aggregate root, status and priority enums, and assignment semantics.

use super::{
    EntityName, ParseTaskPriorityError, ParseTaskStatusError, TaskId, TaskTypeId, WorkerId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Waiting for review.
    NeedsReview,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Every status, in board order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::NeedsReview, Self::Done];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::NeedsReview => "needs_review",
            Self::Done => "done",
        }
    }

    /// Returns the human-readable column title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::NeedsReview => "Needs Review",
            Self::Done => "Done",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "needs_review" => Ok(Self::NeedsReview),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    #[default]
    Low,
    /// Normal urgency.
    Medium,
    /// Urgent.
    High,
}

impl TaskPriority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of toggling a worker's assignment on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentChange {
    /// The worker was added to the assignees.
    Assigned,
    /// The worker was removed from the assignees.
    Unassigned,
}

/// Editable task fields, validated before they reach the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    /// Globally unique task name.
    pub name: EntityName,
    /// Free-form description.
    pub description: String,
    /// Due date.
    pub deadline: DateTime<Utc>,
    /// Completion flag, independent of status.
    pub is_completed: bool,
    /// Urgency.
    pub priority: TaskPriority,
    /// Workflow status.
    pub status: TaskStatus,
    /// Category.
    pub task_type_id: TaskTypeId,
    /// Workers assigned to the task.
    pub assignees: BTreeSet<WorkerId>,
}

impl TaskDetails {
    /// Creates details with default priority, status, and no assignees.
    #[must_use]
    pub const fn new(name: EntityName, deadline: DateTime<Utc>, task_type_id: TaskTypeId) -> Self {
        Self {
            name,
            description: String::new(),
            deadline,
            is_completed: false,
            priority: TaskPriority::Low,
            status: TaskStatus::Todo,
            task_type_id,
            assignees: BTreeSet::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = WorkerId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    name: EntityName,
    description: String,
    deadline: DateTime<Utc>,
    is_completed: bool,
    priority: TaskPriority,
    status: TaskStatus,
    task_type_id: TaskTypeId,
    assignees: BTreeSet<WorkerId>,
}

impl Task {
    /// Creates a new task with a fresh identifier.
    #[must_use]
    pub fn new(details: TaskDetails) -> Self {
        Self::from_persisted(TaskId::new(), details)
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(id: TaskId, details: TaskDetails) -> Self {
        let TaskDetails {
            name,
            description,
            deadline,
            is_completed,
            priority,
            status,
            task_type_id,
            assignees,
        } = details;
        Self {
            id,
            name,
            description,
            deadline,
            is_completed,
            priority,
            status,
            task_type_id,
            assignees,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the unique task name.
    #[must_use]
    pub const fn name(&self) -> &EntityName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the completion flag.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the task type reference.
    #[must_use]
    pub const fn task_type_id(&self) -> TaskTypeId {
        self.task_type_id
    }

    /// Returns the assigned workers.
    #[must_use]
    pub const fn assignees(&self) -> &BTreeSet<WorkerId> {
        &self.assignees
    }

    /// Returns the editable fields of this task.
    #[must_use]
    pub fn details(&self) -> TaskDetails {
        TaskDetails {
            name: self.name.clone(),
            description: self.description.clone(),
            deadline: self.deadline,
            is_completed: self.is_completed,
            priority: self.priority,
            status: self.status,
            task_type_id: self.task_type_id,
            assignees: self.assignees.clone(),
        }
    }

    /// Replaces every editable field.
    pub fn revise(&mut self, details: TaskDetails) {
        let id = self.id;
        *self = Self::from_persisted(id, details);
    }

    /// Sets the workflow status.
    pub const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Returns `true` when the task counts as finished for a worker's
    /// overview: flagged complete or moved to [`TaskStatus::Done`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_completed || self.status == TaskStatus::Done
    }

    /// Returns `true` when the deadline has passed and the task is not
    /// finished.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now && !self.is_finished()
    }

    /// Returns `true` when the worker is assigned.
    #[must_use]
    pub fn is_assigned(&self, worker_id: WorkerId) -> bool {
        self.assignees.contains(&worker_id)
    }

    /// Removes the worker if assigned, otherwise adds them.
    pub fn toggle_assignee(&mut self, worker_id: WorkerId) -> AssignmentChange {
        if self.assignees.remove(&worker_id) {
            AssignmentChange::Unassigned
        } else {
            self.assignees.insert(worker_id);
            AssignmentChange::Assigned
        }
    }

    /// Replaces the entire assignee set.
    pub fn replace_assignees(&mut self, assignees: impl IntoIterator<Item = WorkerId>) {
        self.assignees = assignees.into_iter().collect();
    }

    /// Removes a worker from the assignees, returning whether it was present.
    pub fn remove_assignee(&mut self, worker_id: WorkerId) -> bool {
        self.assignees.remove(&worker_id)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.status)
    }
}

/// Default task ordering: earliest deadline first, then by name.
#[must_use]
pub fn deadline_order(left: &Task, right: &Task) -> std::cmp::Ordering {
    left.deadline
        .cmp(&right.deadline)
        .then_with(|| left.name.cmp(&right.name))
}
