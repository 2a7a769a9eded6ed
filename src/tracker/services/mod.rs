//! Application services for the task tracker.
//!
//! Each service validates input with explicit per-field checks before any
//! storage mutation and reports failures as [`FormErrors`].

mod auth;
mod dashboard;
pub mod forms;
mod position;
mod task;
mod task_type;
mod worker;

pub use auth::{AuthError, AuthResult, AuthService, Authenticated, INVALID_LOGIN_MESSAGE};
pub use dashboard::{Dashboard, DashboardError, DashboardService};
pub use forms::{Choice, FormErrors, NON_FIELD_ERRORS, NameForm, REQUIRED_MESSAGE};
pub use position::{PositionService, PositionServiceError, PositionServiceResult};
pub use task::{
    AssigneeSelection, ScheduledTask, StatusListing, TaskDetail, TaskForm, TaskFormChoices,
    TaskService, TaskServiceError, TaskServiceResult, UNKNOWN_STATUS_TITLE, parse_deadline,
};
pub use task_type::{TaskTypeService, TaskTypeServiceError, TaskTypeServiceResult};
pub use worker::{
    WorkerCreateForm, WorkerDetail, WorkerForm, WorkerService, WorkerServiceError,
    WorkerServiceResult,
};
