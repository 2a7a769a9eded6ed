//! Storage contract checks against the in-memory adapters.

use super::helpers::{sessions, store};
use crate::store_contract;
use eyre::Result;
use rstest::rstest;
use std::sync::Arc;
use taskboard::tracker::adapters::memory::{InMemorySessionStore, InMemoryTrackerStore};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_ordered_and_filtered(store: InMemoryTrackerStore) -> Result<()> {
    store_contract::tasks_are_ordered_and_filtered(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uniqueness_is_enforced(store: InMemoryTrackerStore) -> Result<()> {
    store_contract::uniqueness_is_enforced(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn references_are_maintained(store: InMemoryTrackerStore) -> Result<()> {
    store_contract::references_are_maintained(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignments_stay_consistent(store: InMemoryTrackerStore) -> Result<()> {
    store_contract::assignments_stay_consistent(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workers_are_ordered_and_searchable(store: InMemoryTrackerStore) -> Result<()> {
    store_contract::workers_are_ordered_and_searchable(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sessions_count_visits(
    store: InMemoryTrackerStore,
    sessions: InMemorySessionStore,
) -> Result<()> {
    store_contract::sessions_count_visits(&store, &sessions).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expired_sessions_are_purged(
    store: InMemoryTrackerStore,
    sessions: InMemorySessionStore,
) -> Result<()> {
    store_contract::expired_sessions_are_purged(&store, &sessions).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_replaces_the_held_session(
    store: InMemoryTrackerStore,
    sessions: InMemorySessionStore,
) -> Result<()> {
    store_contract::login_replaces_the_held_session(Arc::new(store), Arc::new(sessions)).await
}
