//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use eyre::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};
use taskboard::tracker::adapters::postgres::{
    PgPool, PostgresSessionStore, PostgresTrackerStore, build_pool, run_migrations,
};

/// Environment variable naming the disposable test database.
pub const DATABASE_URL_VAR: &str = "TASKBOARD_TEST_DATABASE_URL";

const RESET_SQL: &str =
    "TRUNCATE TABLE sessions, task_assignees, tasks, workers, positions, task_types";

static DATABASE_LOCK: Mutex<()> = Mutex::new(());

/// Stores over a freshly emptied database.
///
/// Holds the database lock so tests sharing the database run one at a time.
pub struct PreparedStore {
    /// Tracker storage.
    pub store: PostgresTrackerStore,
    /// Session storage.
    pub sessions: PostgresSessionStore,
    /// Pool shared by both stores.
    pub pool: PgPool,
    _lock: MutexGuard<'static, ()>,
}

/// Returns the test database URL, or `None` to skip.
pub fn database_url() -> Option<String> {
    let url = std::env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty());
    if url.is_none() {
        eprintln!("SKIP-TEST-DATABASE: {DATABASE_URL_VAR} is not set");
    }
    url
}

/// Runs blocking work against one pooled connection.
///
/// # Errors
///
/// Returns an error if no connection is available or `f` fails.
pub async fn with_connection<T, F>(pool: &PgPool, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get()?;
        f(&mut connection)
    })
    .await?
}

/// Migrates and empties the test database, returning stores over it.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or reset.
pub async fn prepared_store() -> Result<Option<PreparedStore>> {
    let Some(url) = database_url() else {
        return Ok(None);
    };
    let lock = DATABASE_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let pool = build_pool(&url, 2)?;
    with_connection(&pool, |connection| {
        run_migrations(connection)?;
        connection.batch_execute(RESET_SQL)?;
        Ok(())
    })
    .await?;
    Ok(Some(PreparedStore {
        store: PostgresTrackerStore::new(pool.clone()),
        sessions: PostgresSessionStore::new(pool.clone()),
        pool,
        _lock: lock,
    }))
}
