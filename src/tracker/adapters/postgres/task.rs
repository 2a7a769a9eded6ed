//! `PostgreSQL` task repository and assignee bookkeeping.

use super::{
    PostgresTrackerStore,
    conversion::{row_to_task, task_to_row},
    contains_pattern,
    models::{AssigneeRow, CountRow, TaskRow},
    row_count,
    schema::{task_assignees, task_types, tasks, workers},
    sql_bound,
};
use crate::tracker::{
    domain::{
        AssignmentChange, EntityName, PageWindow, Task, TaskId, TaskStatus, TaskTypeId, WorkerId,
    },
    ports::{TaskFilter, TaskRepository, TrackerRepositoryError, TrackerRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Nullable, Text, Uuid as SqlUuid};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

const FILTER_CLAUSE: &str = concat!(
    "WHERE ($1::text IS NULL OR t.name ILIKE $1) ",
    "AND ($2::uuid IS NULL OR t.task_type_id = $2) ",
    "AND ($3::text IS NULL OR t.status = $3) ",
    "AND ($4::uuid IS NULL OR EXISTS (",
    "SELECT 1 FROM task_assignees a WHERE a.task_id = t.id AND a.worker_id = $4)) ",
);

/// Nullable SQL parameters for a [`TaskFilter`].
struct FilterParams {
    name: Option<String>,
    task_type_id: Option<Uuid>,
    status: Option<String>,
    assignee: Option<Uuid>,
}

impl From<&TaskFilter> for FilterParams {
    fn from(filter: &TaskFilter) -> Self {
        Self {
            name: filter.name.as_deref().map(contains_pattern),
            task_type_id: filter.task_type_id.map(TaskTypeId::into_inner),
            status: filter.status.map(|status| status.as_str().to_owned()),
            assignee: filter.assignee.map(WorkerId::into_inner),
        }
    }
}

/// Loads assignee ids for the given tasks, grouped by task.
fn load_assignees(
    connection: &mut PgConnection,
    task_ids: Vec<Uuid>,
) -> TrackerRepositoryResult<HashMap<Uuid, Vec<Uuid>>> {
    let rows = task_assignees::table
        .filter(task_assignees::task_id.eq_any(task_ids))
        .select(AssigneeRow::as_select())
        .load::<AssigneeRow>(connection)
        .map_err(TrackerRepositoryError::persistence)?;
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in rows {
        grouped.entry(row.task_id).or_default().push(row.worker_id);
    }
    Ok(grouped)
}

fn hydrate(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> TrackerRepositoryResult<Vec<Task>> {
    let mut assignees = load_assignees(connection, rows.iter().map(|row| row.id).collect())?;
    rows.into_iter()
        .map(|row| {
            let workers = assignees.remove(&row.id).unwrap_or_default();
            row_to_task(row, workers)
        })
        .collect()
}

fn task_exists(connection: &mut PgConnection, id: TaskId) -> TrackerRepositoryResult<()> {
    let found: i64 = tasks::table
        .find(id.into_inner())
        .count()
        .get_result(connection)?;
    if found == 0 {
        return Err(TrackerRepositoryError::TaskNotFound(id));
    }
    Ok(())
}

fn check_workers_exist(
    connection: &mut PgConnection,
    worker_ids: &BTreeSet<WorkerId>,
) -> TrackerRepositoryResult<()> {
    if worker_ids.is_empty() {
        return Ok(());
    }
    let uuids: Vec<Uuid> = worker_ids.iter().map(|id| id.into_inner()).collect();
    let found: BTreeSet<Uuid> = workers::table
        .filter(workers::id.eq_any(uuids))
        .select(workers::id)
        .load::<Uuid>(connection)?
        .into_iter()
        .collect();
    worker_ids
        .iter()
        .find(|id| !found.contains(&id.into_inner()))
        .map_or(Ok(()), |missing| {
            Err(TrackerRepositoryError::WorkerNotFound(*missing))
        })
}

/// Applies the unique-name, task-type, and assignee constraints.
fn check_constraints(connection: &mut PgConnection, task: &Task) -> TrackerRepositoryResult<()> {
    let name_taken: i64 = tasks::table
        .filter(tasks::name.eq(task.name().as_str()))
        .filter(tasks::id.ne(task.id().into_inner()))
        .count()
        .get_result(connection)?;
    if name_taken > 0 {
        return Err(TrackerRepositoryError::DuplicateTaskName(task.name().clone()));
    }
    let task_type_exists: i64 = task_types::table
        .find(task.task_type_id().into_inner())
        .count()
        .get_result(connection)?;
    if task_type_exists == 0 {
        return Err(TrackerRepositoryError::TaskTypeNotFound(task.task_type_id()));
    }
    check_workers_exist(connection, task.assignees())
}

/// Maps constraint violations that slipped past the pre-checks.
fn map_write_error(err: DieselError, task: &Task) -> TrackerRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.constraint_name() == Some("idx_tasks_name_unique") =>
        {
            TrackerRepositoryError::DuplicateTaskName(task.name().clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
            if info.constraint_name() == Some("tasks_task_type_id_fkey") =>
        {
            TrackerRepositoryError::TaskTypeNotFound(task.task_type_id())
        }
        other => TrackerRepositoryError::persistence(other),
    }
}

fn replace_assignee_rows(
    connection: &mut PgConnection,
    id: TaskId,
    worker_ids: &BTreeSet<WorkerId>,
) -> TrackerRepositoryResult<()> {
    diesel::delete(task_assignees::table.filter(task_assignees::task_id.eq(id.into_inner())))
        .execute(connection)?;
    let rows: Vec<AssigneeRow> = worker_ids
        .iter()
        .map(|worker_id| AssigneeRow {
            task_id: id.into_inner(),
            worker_id: worker_id.into_inner(),
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(task_assignees::table)
            .values(&rows)
            .execute(connection)?;
    }
    Ok(())
}

#[async_trait]
impl TaskRepository for PostgresTrackerStore {
    async fn insert_task(&self, task: &Task) -> TrackerRepositoryResult<()> {
        let new_task = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                // The pre-check yields semantic errors; the unique index and
                // foreign keys still enforce integrity under concurrency.
                check_constraints(tx, &new_task)?;
                diesel::insert_into(tasks::table)
                    .values(&task_to_row(&new_task))
                    .execute(tx)
                    .map_err(|err| map_write_error(err, &new_task))?;
                replace_assignee_rows(tx, new_task.id(), new_task.assignees())
            })
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> TrackerRepositoryResult<()> {
        let revised = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                task_exists(tx, revised.id())?;
                check_constraints(tx, &revised)?;
                diesel::update(tasks::table.find(revised.id().into_inner()))
                    .set(&task_to_row(&revised))
                    .execute(tx)
                    .map_err(|err| map_write_error(err, &revised))?;
                replace_assignee_rows(tx, revised.id(), revised.assignees())
            })
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TrackerRepositoryError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> TrackerRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            let Some(found) = row else {
                return Ok(None);
            };
            Ok(hydrate(connection, vec![found])?.pop())
        })
        .await
    }

    async fn task_name_taken(
        &self,
        name: &EntityName,
        except: Option<TaskId>,
    ) -> TrackerRepositoryResult<bool> {
        let wanted = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let mut query = tasks::table.filter(tasks::name.eq(wanted)).into_boxed();
            if let Some(own_id) = except {
                query = query.filter(tasks::id.ne(own_id.into_inner()));
            }
            let taken: i64 = query
                .count()
                .get_result(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            Ok(taken > 0)
        })
        .await
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> TrackerRepositoryResult<u64> {
        let params = FilterParams::from(filter);
        self.run_blocking(move |connection| {
            let query = format!("SELECT COUNT(*) AS count FROM tasks t {FILTER_CLAUSE}");
            let row = diesel::sql_query(query)
                .bind::<Nullable<Text>, _>(params.name)
                .bind::<Nullable<SqlUuid>, _>(params.task_type_id)
                .bind::<Nullable<Text>, _>(params.status)
                .bind::<Nullable<SqlUuid>, _>(params.assignee)
                .get_result::<CountRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            row_count(row.count)
        })
        .await
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        window: Option<PageWindow>,
    ) -> TrackerRepositoryResult<Vec<Task>> {
        let params = FilterParams::from(filter);
        let (limit, offset) = match window {
            Some(bounds) => (Some(sql_bound(bounds.limit)?), sql_bound(bounds.offset)?),
            None => (None, 0),
        };
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(format!(
                "SELECT t.id, t.name, t.description, t.deadline, t.is_completed, t.priority, \
                 t.status, t.task_type_id FROM tasks t {FILTER_CLAUSE}\
                 ORDER BY t.deadline, t.name LIMIT $5 OFFSET $6"
            ))
            .bind::<Nullable<Text>, _>(params.name)
            .bind::<Nullable<SqlUuid>, _>(params.task_type_id)
            .bind::<Nullable<Text>, _>(params.status)
            .bind::<Nullable<SqlUuid>, _>(params.assignee)
            .bind::<Nullable<BigInt>, _>(limit)
            .bind::<BigInt, _>(offset)
            .load::<TaskRow>(connection)
            .map_err(TrackerRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn set_task_status(&self, id: TaskId, status: TaskStatus) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(id.into_inner()))
                .set(tasks::status.eq(status.as_str()))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TrackerRepositoryError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn toggle_assignee(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> TrackerRepositoryResult<AssignmentChange> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                task_exists(tx, id)?;
                check_workers_exist(tx, &BTreeSet::from([worker_id]))?;
                let removed = diesel::delete(
                    task_assignees::table
                        .filter(task_assignees::task_id.eq(id.into_inner()))
                        .filter(task_assignees::worker_id.eq(worker_id.into_inner())),
                )
                .execute(tx)?;
                if removed > 0 {
                    return Ok(AssignmentChange::Unassigned);
                }
                diesel::insert_into(task_assignees::table)
                    .values(AssigneeRow {
                        task_id: id.into_inner(),
                        worker_id: worker_id.into_inner(),
                    })
                    .execute(tx)?;
                Ok(AssignmentChange::Assigned)
            })
        })
        .await
    }

    async fn set_assignees(
        &self,
        id: TaskId,
        workers: &BTreeSet<WorkerId>,
    ) -> TrackerRepositoryResult<()> {
        let assignees = workers.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TrackerRepositoryError, _>(|tx| {
                task_exists(tx, id)?;
                check_workers_exist(tx, &assignees)?;
                replace_assignee_rows(tx, id, &assignees)
            })
        })
        .await
    }
}
