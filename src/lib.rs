//! Taskboard: task tracking for a small team.
//!
//! Workers hold positions and are assigned tasks of a given type. Tasks move
//! through four statuses (to do, in progress, needs review, done) and are
//! listed, searched, and paginated through a session-authenticated HTTP
//! surface.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: validated entities with no infrastructure dependencies
//! - **Ports**: async repository and session store traits
//! - **Adapters**: in-memory and Diesel/`PostgreSQL` implementations
//! - **Services**: form validation and orchestration over the ports
//!
//! # Modules
//!
//! - [`tracker`]: the task tracker bounded context
//! - [`web`]: axum router and handlers
//! - [`config`]: environment configuration
//! - [`telemetry`]: `tracing` subscriber setup

pub mod config;
pub mod telemetry;
pub mod tracker;
pub mod web;
