//! `PostgreSQL` adapters for tracker persistence using Diesel ORM.
//!
//! Every repository method borrows one pooled connection on the blocking
//! thread pool. Mutations that touch more than one row run inside a single
//! transaction. Referential behaviour (set-null on position deletion,
//! restrict on task type deletion, cascading assignment cleanup) is enforced
//! by the schema as well as by the semantic pre-checks made here.

mod conversion;
mod migrations;
mod models;
mod pool;
mod position;
mod schema;
mod session;
mod task;
mod task_type;
mod worker;

pub use migrations::{MigrationError, run_migrations};
pub use pool::{PgPool, build_pool};
pub use session::PostgresSessionStore;

use crate::tracker::ports::{TrackerRepositoryError, TrackerRepositoryResult};
use diesel::pg::PgConnection;

/// `PostgreSQL`-backed implementation of every tracker repository port.
///
/// # Example
///
/// ```ignore
/// use taskboard::tracker::adapters::postgres::{PostgresTrackerStore, build_pool};
///
/// let pool = build_pool("postgres://localhost/taskboard", 10)?;
/// let store = PostgresTrackerStore::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTrackerStore {
    pool: PgPool,
}

impl PostgresTrackerStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> TrackerRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TrackerRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TrackerRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TrackerRepositoryError::persistence)?
    }
}

impl From<diesel::result::Error> for TrackerRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

/// Builds an `ILIKE` pattern matching `term` anywhere, escaping wildcards.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Converts a page window bound to the `BIGINT` Postgres expects.
fn sql_bound(value: u64) -> TrackerRepositoryResult<i64> {
    i64::try_from(value).map_err(TrackerRepositoryError::persistence)
}

/// Converts a `COUNT(*)` result to the port's `u64`.
fn row_count(value: i64) -> TrackerRepositoryResult<u64> {
    u64::try_from(value).map_err(TrackerRepositoryError::invalid_persisted_data)
}
