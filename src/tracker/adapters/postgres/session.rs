//! `PostgreSQL` session store.

use super::{
    PgPool,
    conversion::{row_to_session, session_to_row},
    models::SessionRow,
    schema::sessions,
};
use crate::tracker::{
    domain::{Session, SessionId},
    ports::{SessionStore, SessionStoreError, SessionStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> SessionStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SessionStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SessionStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SessionStoreError::persistence)?
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn insert_session(&self, session: &Session) -> SessionStoreResult<()> {
        let row = session_to_row(session)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(sessions::table)
                .values(&row)
                .execute(connection)
                .map_err(SessionStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_session(&self, id: SessionId) -> SessionStoreResult<Option<Session>> {
        self.run_blocking(move |connection| {
            sessions::table
                .find(id.into_inner())
                .select(SessionRow::as_select())
                .first::<SessionRow>(connection)
                .optional()
                .map_err(SessionStoreError::persistence)?
                .map(row_to_session)
                .transpose()
        })
        .await
    }

    async fn record_visit(&self, id: SessionId) -> SessionStoreResult<u64> {
        self.run_blocking(move |connection| {
            // A single UPDATE ... RETURNING keeps concurrent visits from
            // losing increments.
            let visits: i64 = diesel::update(sessions::table.find(id.into_inner()))
                .set(sessions::num_visits.eq(sessions::num_visits + 1))
                .returning(sessions::num_visits)
                .get_result(connection)
                .optional()
                .map_err(SessionStoreError::persistence)?
                .ok_or(SessionStoreError::NotFound(id))?;
            u64::try_from(visits).map_err(SessionStoreError::persistence)
        })
        .await
    }

    async fn delete_session(&self, id: SessionId) -> SessionStoreResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(sessions::table.find(id.into_inner()))
                .execute(connection)
                .map_err(SessionStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> SessionStoreResult<u64> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
                .execute(connection)
                .map_err(SessionStoreError::persistence)?;
            u64::try_from(removed).map_err(SessionStoreError::persistence)
        })
        .await
    }
}
