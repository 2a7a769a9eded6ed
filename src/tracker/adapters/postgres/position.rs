//! `PostgreSQL` position repository.

use super::{
    PostgresTrackerStore,
    conversion::{position_to_row, row_to_position},
    contains_pattern,
    models::{CountRow, NamedCountRow, PositionRow},
    row_count,
    schema::positions,
    sql_bound,
};
use crate::tracker::{
    domain::{PageWindow, Position, PositionId, PositionSummary},
    ports::{PositionRepository, TrackerRepositoryError, TrackerRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};

#[async_trait]
impl PositionRepository for PostgresTrackerStore {
    async fn insert_position(&self, position: &Position) -> TrackerRepositoryResult<()> {
        let row = position_to_row(position);
        self.run_blocking(move |connection| {
            diesel::insert_into(positions::table)
                .values(&row)
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_position(&self, position: &Position) -> TrackerRepositoryResult<()> {
        let row = position_to_row(position);
        let id = position.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(positions::table.find(row.id))
                .set(positions::name.eq(&row.name))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TrackerRepositoryError::PositionNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_position(&self, id: PositionId) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // Workers are detached by the ON DELETE SET NULL foreign key.
            let deleted = diesel::delete(positions::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TrackerRepositoryError::PositionNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_position(&self, id: PositionId) -> TrackerRepositoryResult<Option<Position>> {
        self.run_blocking(move |connection| {
            positions::table
                .find(id.into_inner())
                .select(PositionRow::as_select())
                .first::<PositionRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?
                .map(row_to_position)
                .transpose()
        })
        .await
    }

    async fn list_positions(&self) -> TrackerRepositoryResult<Vec<Position>> {
        self.run_blocking(move |connection| {
            positions::table
                .order((positions::name.asc(), positions::id.asc()))
                .select(PositionRow::as_select())
                .load::<PositionRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?
                .into_iter()
                .map(row_to_position)
                .collect()
        })
        .await
    }

    async fn count_positions(&self, name: Option<&str>) -> TrackerRepositoryResult<u64> {
        let pattern = name.map(contains_pattern);
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(
                "SELECT COUNT(*) AS count FROM positions WHERE ($1::text IS NULL OR name ILIKE $1)",
            )
            .bind::<Nullable<Text>, _>(pattern)
            .get_result::<CountRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?;
            row_count(row.count)
        })
        .await
    }

    async fn position_summaries(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<PositionSummary>> {
        let pattern = name.map(contains_pattern);
        let limit = sql_bound(window.limit)?;
        let offset = sql_bound(window.offset)?;
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(concat!(
                "SELECT p.id, p.name, COUNT(w.id) AS related_count ",
                "FROM positions p LEFT JOIN workers w ON w.position_id = p.id ",
                "WHERE ($1::text IS NULL OR p.name ILIKE $1) ",
                "GROUP BY p.id, p.name ORDER BY p.name, p.id LIMIT $2 OFFSET $3",
            ))
            .bind::<Nullable<Text>, _>(pattern)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load::<NamedCountRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?;

            rows.into_iter()
                .map(|row| {
                    Ok(PositionSummary {
                        worker_count: row_count(row.related_count)?,
                        position: row_to_position(PositionRow {
                            id: row.id,
                            name: row.name,
                        })?,
                    })
                })
                .collect()
        })
        .await
    }
}
