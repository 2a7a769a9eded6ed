//! Shared test helpers for in-memory adapter integration tests.

use rstest::fixture;
use taskboard::tracker::adapters::memory::{InMemorySessionStore, InMemoryTrackerStore};

/// Provides a fresh tracker store for each test.
#[fixture]
pub fn store() -> InMemoryTrackerStore {
    InMemoryTrackerStore::new()
}

/// Provides a fresh session store for each test.
#[fixture]
pub fn sessions() -> InMemorySessionStore {
    InMemorySessionStore::new()
}
