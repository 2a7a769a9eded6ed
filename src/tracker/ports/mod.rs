//! Port contracts for the task tracker.
//!
//! Ports define infrastructure-agnostic interfaces used by tracker services.

pub mod filter;
pub mod repository;
pub mod session;

pub use filter::{TaskFilter, WorkerFilter, contains_ignore_case, search_term};
pub use repository::{
    PositionRepository, TaskRepository, TaskTypeRepository, TrackerRepositoryError,
    TrackerRepositoryResult, TrackerStore, WorkerRepository,
};
pub use session::{SessionStore, SessionStoreError, SessionStoreResult};
