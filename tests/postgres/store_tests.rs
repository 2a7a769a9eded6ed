//! Storage contract checks against the `PostgreSQL` adapters.

use super::helpers::prepared_store;
use crate::store_contract;
use eyre::Result;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_ordered_and_filtered() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::tasks_are_ordered_and_filtered(&prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn uniqueness_is_enforced() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::uniqueness_is_enforced(&prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn references_are_maintained() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::references_are_maintained(&prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn assignments_stay_consistent() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::assignments_stay_consistent(&prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn workers_are_ordered_and_searchable() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::workers_are_ordered_and_searchable(&prepared.store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn sessions_count_visits() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::sessions_count_visits(&prepared.store, &prepared.sessions).await
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_sessions_are_purged() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::expired_sessions_are_purged(&prepared.store, &prepared.sessions).await
}

#[tokio::test(flavor = "multi_thread")]
async fn login_replaces_the_held_session() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    store_contract::login_replaces_the_held_session(
        Arc::new(prepared.store.clone()),
        Arc::new(prepared.sessions.clone()),
    )
    .await
}
