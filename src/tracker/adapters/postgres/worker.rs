//! `PostgreSQL` worker repository.

use super::{
    PostgresTrackerStore,
    conversion::{row_to_worker, row_to_worker_with_position, worker_to_row},
    contains_pattern,
    models::{CountRow, WorkerPositionRow, WorkerRow},
    row_count,
    schema::{positions, workers},
    sql_bound,
};
use crate::tracker::{
    domain::{PageWindow, PositionId, Username, Worker, WorkerId, WorkerWithPosition},
    ports::{TrackerRepositoryError, TrackerRepositoryResult, WorkerFilter, WorkerRepository},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Nullable, Text, Uuid as SqlUuid};
use std::collections::BTreeSet;
use uuid::Uuid;

const WORKER_POSITION_SELECT: &str = concat!(
    "SELECT w.id, w.username, w.first_name, w.last_name, w.position_id, w.password, ",
    "p.name AS position_name ",
    "FROM workers w LEFT JOIN positions p ON p.id = w.position_id ",
);

/// Splits a worker filter into nullable SQL parameters.
fn filter_params(filter: &WorkerFilter) -> (Option<String>, Option<Uuid>) {
    match filter {
        WorkerFilter::All => (None, None),
        WorkerFilter::Username(term) => (Some(contains_pattern(term)), None),
        WorkerFilter::Position(position_id) => (None, Some(position_id.into_inner())),
    }
}

/// Rejects a username held by another worker or a dangling position.
fn check_constraints(
    connection: &mut PgConnection,
    row: &WorkerRow,
) -> TrackerRepositoryResult<()> {
    let username_taken: i64 = workers::table
        .filter(workers::username.eq(&row.username))
        .filter(workers::id.ne(row.id))
        .count()
        .get_result(connection)?;
    if username_taken > 0 {
        return Err(duplicate_username(&row.username));
    }
    if let Some(position_id) = row.position_id {
        let position_exists: i64 = positions::table
            .find(position_id)
            .count()
            .get_result(connection)?;
        if position_exists == 0 {
            return Err(TrackerRepositoryError::PositionNotFound(
                PositionId::from_uuid(position_id),
            ));
        }
    }
    Ok(())
}

fn duplicate_username(username: &str) -> TrackerRepositoryError {
    Username::new(username).map_or_else(
        TrackerRepositoryError::invalid_persisted_data,
        TrackerRepositoryError::DuplicateUsername,
    )
}

/// Maps constraint violations that slipped past the pre-checks.
fn map_write_error(err: DieselError, row: &WorkerRow) -> TrackerRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.constraint_name() == Some("idx_workers_username_unique") =>
        {
            duplicate_username(&row.username)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => row
            .position_id
            .map_or_else(
                || TrackerRepositoryError::persistence(err),
                |id| TrackerRepositoryError::PositionNotFound(PositionId::from_uuid(id)),
            ),
        other => TrackerRepositoryError::persistence(other),
    }
}

#[async_trait]
impl WorkerRepository for PostgresTrackerStore {
    async fn insert_worker(&self, worker: &Worker) -> TrackerRepositoryResult<()> {
        let row = worker_to_row(worker);
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                check_constraints(tx, &row)?;
                diesel::insert_into(workers::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| map_write_error(err, &row))?;
                Ok(())
            })
        })
        .await
    }

    async fn update_worker(&self, worker: &Worker) -> TrackerRepositoryResult<()> {
        let row = worker_to_row(worker);
        let id = worker.id();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                check_constraints(tx, &row)?;
                let updated = diesel::update(workers::table.find(row.id))
                    .set(&row)
                    .execute(tx)
                    .map_err(|err| map_write_error(err, &row))?;
                if updated == 0 {
                    return Err(TrackerRepositoryError::WorkerNotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_worker(&self, id: WorkerId) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // Assignments and sessions go with the worker via ON DELETE CASCADE.
            let deleted = diesel::delete(workers::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TrackerRepositoryError::WorkerNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_worker(&self, id: WorkerId) -> TrackerRepositoryResult<Option<Worker>> {
        self.run_blocking(move |connection| {
            workers::table
                .find(id.into_inner())
                .select(WorkerRow::as_select())
                .first::<WorkerRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?
                .map(row_to_worker)
                .transpose()
        })
        .await
    }

    async fn find_worker_with_position(
        &self,
        id: WorkerId,
    ) -> TrackerRepositoryResult<Option<WorkerWithPosition>> {
        self.run_blocking(move |connection| {
            diesel::sql_query(format!("{WORKER_POSITION_SELECT}WHERE w.id = $1"))
                .bind::<SqlUuid, _>(id.into_inner())
                .get_result::<WorkerPositionRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?
                .map(row_to_worker_with_position)
                .transpose()
        })
        .await
    }

    async fn find_worker_by_username(
        &self,
        username: &Username,
    ) -> TrackerRepositoryResult<Option<Worker>> {
        let wanted = username.as_str().to_owned();
        self.run_blocking(move |connection| {
            workers::table
                .filter(workers::username.eq(wanted))
                .select(WorkerRow::as_select())
                .first::<WorkerRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?
                .map(row_to_worker)
                .transpose()
        })
        .await
    }

    async fn find_workers(&self, ids: &BTreeSet<WorkerId>) -> TrackerRepositoryResult<Vec<Worker>> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            workers::table
                .filter(workers::id.eq_any(uuids))
                .order(workers::username.asc())
                .select(WorkerRow::as_select())
                .load::<WorkerRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?
                .into_iter()
                .map(row_to_worker)
                .collect()
        })
        .await
    }

    async fn list_workers(&self) -> TrackerRepositoryResult<Vec<Worker>> {
        self.run_blocking(move |connection| {
            workers::table
                .order(workers::username.asc())
                .select(WorkerRow::as_select())
                .load::<WorkerRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?
                .into_iter()
                .map(row_to_worker)
                .collect()
        })
        .await
    }

    async fn count_workers(&self, filter: &WorkerFilter) -> TrackerRepositoryResult<u64> {
        let (pattern, position_id) = filter_params(filter);
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(concat!(
                "SELECT COUNT(*) AS count FROM workers ",
                "WHERE ($1::text IS NULL OR username ILIKE $1) ",
                "AND ($2::uuid IS NULL OR position_id = $2)",
            ))
            .bind::<Nullable<Text>, _>(pattern)
            .bind::<Nullable<SqlUuid>, _>(position_id)
            .get_result::<CountRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?;
            row_count(row.count)
        })
        .await
    }

    async fn workers_with_positions(
        &self,
        filter: &WorkerFilter,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<WorkerWithPosition>> {
        let (pattern, position_id) = filter_params(filter);
        let limit = sql_bound(window.limit)?;
        let offset = sql_bound(window.offset)?;
        self.run_blocking(move |connection| {
            diesel::sql_query(format!(
                "{WORKER_POSITION_SELECT}\
                 WHERE ($1::text IS NULL OR w.username ILIKE $1) \
                 AND ($2::uuid IS NULL OR w.position_id = $2) \
                 ORDER BY w.username LIMIT $3 OFFSET $4"
            ))
            .bind::<Nullable<Text>, _>(pattern)
            .bind::<Nullable<SqlUuid>, _>(position_id)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load::<WorkerPositionRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?
            .into_iter()
            .map(row_to_worker_with_position)
            .collect()
        })
        .await
    }
}
