//! Task tracking for workers, positions, and task types.
//!
//! Tasks are grouped into status columns, assigned to workers, and
//! categorized by task type; workers hold optional positions. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
