//! Domain model for the task tracker.
//!
//! Positions, workers, task types, and tasks, plus the validated scalars,
//! board partitioning, pagination, and session records built on them. Nothing
//! in here touches storage or HTTP.

mod board;
mod credential;
mod error;
mod ids;
mod name;
mod page;
mod position;
mod session;
mod task;
mod task_type;
mod worker;

pub use board::{StatusBoard, WorkerTaskGroups};
pub use credential::{
    MIN_PASSWORD_LENGTH, PASSWORD_SCHEME, PBKDF2_ITERATIONS, PasswordHash,
    password_policy_violations,
};
pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TrackerDomainError};
pub use ids::{PositionId, SessionId, TaskId, TaskTypeId, WorkerId};
pub use name::{
    EntityName, MAX_ENTITY_NAME_LENGTH, MAX_PERSON_FIELD_LENGTH, PersonName, Username,
};
pub use page::{PAGE_SIZE, Page, PageError, PageRequest, PageWindow};
pub use position::{Position, PositionSummary};
pub use session::{PersistedSessionData, Session};
pub use task::{
    AssignmentChange, Task, TaskDetails, TaskPriority, TaskStatus, deadline_order,
};
pub use task_type::{TaskType, TaskTypeSummary};
pub use worker::{Worker, WorkerProfile, WorkerWithPosition};
