//! Worker aggregate: an account that can log in and be assigned tasks.

use super::{PasswordHash, PersonName, Position, PositionId, Username, WorkerId};
use serde::Serialize;
use std::fmt;

/// Editable profile fields of a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProfile {
    /// Unique login name.
    pub username: Username,
    /// Given name, possibly empty.
    pub first_name: PersonName,
    /// Family name, possibly empty.
    pub last_name: PersonName,
    /// Position held, if any.
    pub position_id: Option<PositionId>,
}

/// Worker account.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worker {
    id: WorkerId,
    username: Username,
    first_name: PersonName,
    last_name: PersonName,
    position_id: Option<PositionId>,
    #[serde(skip)]
    password: PasswordHash,
}

impl Worker {
    /// Creates a new worker with a fresh identifier.
    #[must_use]
    pub fn new(profile: WorkerProfile, password: PasswordHash) -> Self {
        Self::from_persisted(WorkerId::new(), profile, password)
    }

    /// Reconstructs a worker from persisted storage.
    #[must_use]
    pub fn from_persisted(id: WorkerId, profile: WorkerProfile, password: PasswordHash) -> Self {
        let WorkerProfile {
            username,
            first_name,
            last_name,
            position_id,
        } = profile;
        Self {
            id,
            username,
            first_name,
            last_name,
            position_id,
            password,
        }
    }

    /// Returns the worker identifier.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the given name.
    #[must_use]
    pub const fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Returns the family name.
    #[must_use]
    pub const fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Returns the referenced position, if any.
    #[must_use]
    pub const fn position_id(&self) -> Option<PositionId> {
        self.position_id
    }

    /// Returns the stored password credential.
    #[must_use]
    pub const fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Returns the editable profile fields.
    #[must_use]
    pub fn profile(&self) -> WorkerProfile {
        WorkerProfile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            position_id: self.position_id,
        }
    }

    /// Replaces the editable profile fields, keeping identity and password.
    pub fn apply_profile(&mut self, profile: WorkerProfile) {
        self.username = profile.username;
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
        self.position_id = profile.position_id;
    }

    /// Verifies a plaintext password against the stored credential.
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }
}

/// Worker joined with its position, loaded in a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerWithPosition {
    /// The worker.
    #[serde(flatten)]
    pub worker: Worker,
    /// The referenced position, if any.
    pub position: Option<Position>,
}

impl fmt::Display for WorkerWithPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self
            .position
            .as_ref()
            .map_or_else(|| "None".to_owned(), ToString::to_string);
        write!(
            f,
            "{} {} ({position})",
            self.worker.first_name, self.worker.last_name
        )
    }
}
