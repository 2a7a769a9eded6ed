//! `PostgreSQL` task type repository.

use super::{
    PostgresTrackerStore,
    conversion::{row_to_task_type, task_type_to_row},
    contains_pattern,
    models::{CountRow, NamedCountRow, TaskTypeRow},
    row_count,
    schema::{task_types, tasks},
    sql_bound,
};
use crate::tracker::{
    domain::{PageWindow, TaskType, TaskTypeId, TaskTypeSummary},
    ports::{TaskTypeRepository, TrackerRepositoryError, TrackerRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Nullable, Text};

#[async_trait]
impl TaskTypeRepository for PostgresTrackerStore {
    async fn insert_task_type(&self, task_type: &TaskType) -> TrackerRepositoryResult<()> {
        let row = task_type_to_row(task_type);
        self.run_blocking(move |connection| {
            diesel::insert_into(task_types::table)
                .values(&row)
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_task_type(&self, task_type: &TaskType) -> TrackerRepositoryResult<()> {
        let row = task_type_to_row(task_type);
        let id = task_type.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(task_types::table.find(row.id))
                .set(task_types::name.eq(&row.name))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TrackerRepositoryError::TaskTypeNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_task_type(&self, id: TaskTypeId) -> TrackerRepositoryResult<()> {
        let uuid = id.into_inner();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                let task_count: i64 = tasks::table
                    .filter(tasks::task_type_id.eq(uuid))
                    .count()
                    .get_result(tx)
                    .map_err(TrackerRepositoryError::persistence)?;
                if task_count > 0 {
                    return Err(TrackerRepositoryError::TaskTypeInUse {
                        id,
                        task_count: row_count(task_count)?,
                    });
                }

                // The RESTRICT foreign key still guards a task inserted
                // concurrently after the count above.
                let deleted = diesel::delete(task_types::table.find(uuid))
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            TrackerRepositoryError::TaskTypeInUse { id, task_count: 1 }
                        }
                        other => TrackerRepositoryError::persistence(other),
                    })?;
                if deleted == 0 {
                    return Err(TrackerRepositoryError::TaskTypeNotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_task_type(&self, id: TaskTypeId) -> TrackerRepositoryResult<Option<TaskType>> {
        self.run_blocking(move |connection| {
            task_types::table
                .find(id.into_inner())
                .select(TaskTypeRow::as_select())
                .first::<TaskTypeRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?
                .map(row_to_task_type)
                .transpose()
        })
        .await
    }

    async fn list_task_types(&self) -> TrackerRepositoryResult<Vec<TaskType>> {
        self.run_blocking(move |connection| {
            task_types::table
                .order((task_types::name.asc(), task_types::id.asc()))
                .select(TaskTypeRow::as_select())
                .load::<TaskTypeRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?
                .into_iter()
                .map(row_to_task_type)
                .collect()
        })
        .await
    }

    async fn count_task_types(&self, name: Option<&str>) -> TrackerRepositoryResult<u64> {
        let pattern = name.map(contains_pattern);
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(
                "SELECT COUNT(*) AS count FROM task_types WHERE ($1::text IS NULL OR name ILIKE $1)",
            )
            .bind::<Nullable<Text>, _>(pattern)
            .get_result::<CountRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?;
            row_count(row.count)
        })
        .await
    }

    async fn task_type_summaries(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> TrackerRepositoryResult<Vec<TaskTypeSummary>> {
        let pattern = name.map(contains_pattern);
        let limit = sql_bound(window.limit)?;
        let offset = sql_bound(window.offset)?;
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(concat!(
                "SELECT tt.id, tt.name, COUNT(t.id) AS related_count ",
                "FROM task_types tt LEFT JOIN tasks t ON t.task_type_id = tt.id ",
                "WHERE ($1::text IS NULL OR tt.name ILIKE $1) ",
                "GROUP BY tt.id, tt.name ORDER BY tt.name, tt.id LIMIT $2 OFFSET $3",
            ))
            .bind::<Nullable<Text>, _>(pattern)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load::<NamedCountRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?;

            rows.into_iter()
                .map(|row| {
                    Ok(TaskTypeSummary {
                        task_count: row_count(row.related_count)?,
                        task_type: row_to_task_type(TaskTypeRow {
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
