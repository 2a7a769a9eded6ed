//! Diesel row models for tracker persistence.

use super::schema::{positions, sessions, task_assignees, task_types, tasks, workers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamptz, Uuid as SqlUuid, Varchar};
use uuid::Uuid;

/// Position row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PositionRow {
    /// Position identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// Task type row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskTypeRow {
    /// Task type identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// Worker row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = workers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct WorkerRow {
    /// Worker identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Held position.
    pub position_id: Option<Uuid>,
    /// Encoded password hash.
    pub password: String,
}

/// Task row, read through the DSL or raw filtered SQL.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    /// Unique task name.
    #[diesel(sql_type = Varchar)]
    pub name: String,
    /// Free-form description.
    #[diesel(sql_type = Text)]
    pub description: String,
    /// Due date and time.
    #[diesel(sql_type = Timestamptz)]
    pub deadline: DateTime<Utc>,
    /// Completion flag.
    #[diesel(sql_type = Bool)]
    pub is_completed: bool,
    /// Priority key.
    #[diesel(sql_type = Varchar)]
    pub priority: String,
    /// Status key.
    #[diesel(sql_type = Varchar)]
    pub status: String,
    /// Task category.
    #[diesel(sql_type = SqlUuid)]
    pub task_type_id: Uuid,
}

/// Assignment join row.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_assignees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssigneeRow {
    /// Assigned task.
    pub task_id: Uuid,
    /// Assigned worker.
    pub worker_id: Uuid,
}

/// Session row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    /// Session identifier.
    pub id: Uuid,
    /// Authenticated worker.
    pub worker_id: Uuid,
    /// Visit counter.
    pub num_visits: i64,
    /// Login timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Named-entity row annotated with a related-row count.
#[derive(Debug, Clone, QueryableByName)]
pub struct NamedCountRow {
    /// Entity identifier.
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    /// Entity name.
    #[diesel(sql_type = Varchar)]
    pub name: String,
    /// Number of related rows.
    #[diesel(sql_type = BigInt)]
    pub related_count: i64,
}

/// Worker row joined with its optional position name.
#[derive(Debug, Clone, QueryableByName)]
pub struct WorkerPositionRow {
    /// Worker identifier.
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    /// Login name.
    #[diesel(sql_type = Varchar)]
    pub username: String,
    /// Given name.
    #[diesel(sql_type = Varchar)]
    pub first_name: String,
    /// Family name.
    #[diesel(sql_type = Varchar)]
    pub last_name: String,
    /// Held position.
    #[diesel(sql_type = Nullable<SqlUuid>)]
    pub position_id: Option<Uuid>,
    /// Encoded password hash.
    #[diesel(sql_type = Varchar)]
    pub password: String,
    /// Name of the held position.
    #[diesel(sql_type = Nullable<Varchar>)]
    pub position_name: Option<String>,
}

/// Single `COUNT(*)` result.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct CountRow {
    /// Row count.
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}
