//! Embedded migration bookkeeping.

use super::helpers::{prepared_store, with_connection};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use eyre::{Result, ensure};
use taskboard::tracker::adapters::postgres::run_migrations;

#[tokio::test(flavor = "multi_thread")]
async fn rerunning_migrations_applies_nothing() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };

    let applied = with_connection(&prepared.pool, |connection| {
        Ok(run_migrations(connection)?)
    })
    .await?;

    ensure!(applied.is_empty(), "already-applied migrations ran again: {applied:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn migrated_schema_has_every_table() -> Result<()> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };

    let count = with_connection(&prepared.pool, |connection| {
        Ok(diesel::select(sql::<BigInt>(
            "(SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name IN \
             ('positions', 'task_types', 'workers', 'tasks', 'task_assignees', 'sessions'))",
        ))
        .get_result::<i64>(connection)?)
    })
    .await?;

    ensure!(count == 6, "expected six tracker tables, found {count}");
    Ok(())
}
