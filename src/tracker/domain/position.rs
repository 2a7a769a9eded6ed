//! Position aggregate: the job title a worker holds.

use super::{EntityName, PositionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job position referenced by workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    id: PositionId,
    name: EntityName,
}

impl Position {
    /// Creates a new position with a fresh identifier.
    #[must_use]
    pub fn new(name: EntityName) -> Self {
        Self {
            id: PositionId::new(),
            name,
        }
    }

    /// Reconstructs a position from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: PositionId, name: EntityName) -> Self {
        Self { id, name }
    }

    /// Returns the position identifier.
    #[must_use]
    pub const fn id(&self) -> PositionId {
        self.id
    }

    /// Returns the position name.
    #[must_use]
    pub const fn name(&self) -> &EntityName {
        &self.name
    }

    /// Replaces the position name.
    pub fn rename(&mut self, name: EntityName) {
        self.name = name;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Position annotated with the number of workers holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    /// The position itself.
    #[serde(flatten)]
    pub position: Position,
    /// Number of workers referencing the position.
    pub worker_count: u64,
}
