//! Task type lookup entity.

use super::{EntityName, TaskTypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category a task belongs to (bug, feature, refactoring, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    id: TaskTypeId,
    name: EntityName,
}

impl TaskType {
    /// Creates a new task type with a fresh identifier.
    #[must_use]
    pub fn new(name: EntityName) -> Self {
        Self {
            id: TaskTypeId::new(),
            name,
        }
    }

    /// Reconstructs a task type from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: TaskTypeId, name: EntityName) -> Self {
        Self { id, name }
    }

    /// Returns the task type identifier.
    #[must_use]
    pub const fn id(&self) -> TaskTypeId {
        self.id
    }

    /// Returns the task type name.
    #[must_use]
    pub const fn name(&self) -> &EntityName {
        &self.name
    }

    /// Replaces the task type name.
    pub fn rename(&mut self, name: EntityName) {
        self.name = name;
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Task type annotated with the number of tasks referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTypeSummary {
    /// The task type itself.
    #[serde(flatten)]
    pub task_type: TaskType,
    /// Number of tasks of this type.
    pub task_count: u64,
}
