//! Row and domain conversions.

use super::models::{PositionRow, SessionRow, TaskRow, TaskTypeRow, WorkerPositionRow, WorkerRow};
use crate::tracker::{
    domain::{
        EntityName, PasswordHash, PersistedSessionData, PersonName, Position, PositionId, Session,
        SessionId, Task, TaskDetails, TaskId, TaskPriority, TaskStatus, TaskType, TaskTypeId,
        Username, Worker, WorkerId, WorkerProfile, WorkerWithPosition,
    },
    ports::{SessionStoreError, TrackerRepositoryError, TrackerRepositoryResult},
};
use std::collections::BTreeSet;
use uuid::Uuid;

pub(super) fn position_to_row(position: &Position) -> PositionRow {
    PositionRow {
        id: position.id().into_inner(),
        name: position.name().as_str().to_owned(),
    }
}

pub(super) fn row_to_position(row: PositionRow) -> TrackerRepositoryResult<Position> {
    let name = EntityName::new(row.name).map_err(TrackerRepositoryError::invalid_persisted_data)?;
    Ok(Position::from_persisted(PositionId::from_uuid(row.id), name))
}

pub(super) fn task_type_to_row(task_type: &TaskType) -> TaskTypeRow {
    TaskTypeRow {
        id: task_type.id().into_inner(),
        name: task_type.name().as_str().to_owned(),
    }
}

pub(super) fn row_to_task_type(row: TaskTypeRow) -> TrackerRepositoryResult<TaskType> {
    let name = EntityName::new(row.name).map_err(TrackerRepositoryError::invalid_persisted_data)?;
    Ok(TaskType::from_persisted(TaskTypeId::from_uuid(row.id), name))
}

pub(super) fn worker_to_row(worker: &Worker) -> WorkerRow {
    WorkerRow {
        id: worker.id().into_inner(),
        username: worker.username().as_str().to_owned(),
        first_name: worker.first_name().as_str().to_owned(),
        last_name: worker.last_name().as_str().to_owned(),
        position_id: worker.position_id().map(PositionId::into_inner),
        password: worker.password().as_str().to_owned(),
    }
}

pub(super) fn row_to_worker(row: WorkerRow) -> TrackerRepositoryResult<Worker> {
    let WorkerRow {
        id,
        username,
        first_name,
        last_name,
        position_id,
        password,
    } = row;
    let profile = WorkerProfile {
        username: Username::new(username).map_err(TrackerRepositoryError::invalid_persisted_data)?,
        first_name: PersonName::new(first_name)
            .map_err(TrackerRepositoryError::invalid_persisted_data)?,
        last_name: PersonName::new(last_name)
            .map_err(TrackerRepositoryError::invalid_persisted_data)?,
        position_id: position_id.map(PositionId::from_uuid),
    };
    let hash =
        PasswordHash::parse(password).map_err(TrackerRepositoryError::invalid_persisted_data)?;
    Ok(Worker::from_persisted(WorkerId::from_uuid(id), profile, hash))
}

pub(super) fn row_to_worker_with_position(
    row: WorkerPositionRow,
) -> TrackerRepositoryResult<WorkerWithPosition> {
    let WorkerPositionRow {
        id,
        username,
        first_name,
        last_name,
        position_id,
        password,
        position_name,
    } = row;
    let position = match (position_id, position_name) {
        (Some(joined_id), Some(name)) => Some(row_to_position(PositionRow {
            id: joined_id,
            name,
        })?),
        _ => None,
    };
    let worker = row_to_worker(WorkerRow {
        id,
        username,
        first_name,
        last_name,
        position_id,
        password,
    })?;
    Ok(WorkerWithPosition { worker, position })
}

pub(super) fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        name: task.name().as_str().to_owned(),
        description: task.description().to_owned(),
        deadline: task.deadline(),
        is_completed: task.is_completed(),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        task_type_id: task.task_type_id().into_inner(),
    }
}

pub(super) fn row_to_task(
    row: TaskRow,
    assignees: impl IntoIterator<Item = Uuid>,
) -> TrackerRepositoryResult<Task> {
    let name = EntityName::new(row.name).map_err(TrackerRepositoryError::invalid_persisted_data)?;
    let priority = TaskPriority::try_from(row.priority.as_str())
        .map_err(TrackerRepositoryError::invalid_persisted_data)?;
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(TrackerRepositoryError::invalid_persisted_data)?;
    let worker_ids: BTreeSet<WorkerId> = assignees.into_iter().map(WorkerId::from_uuid).collect();
    let details = TaskDetails::new(name, row.deadline, TaskTypeId::from_uuid(row.task_type_id))
        .with_description(row.description)
        .with_completed(row.is_completed)
        .with_priority(priority)
        .with_status(status)
        .with_assignees(worker_ids);
    Ok(Task::from_persisted(TaskId::from_uuid(row.id), details))
}

pub(super) fn session_to_row(session: &Session) -> Result<SessionRow, SessionStoreError> {
    Ok(SessionRow {
        id: session.id().into_inner(),
        worker_id: session.worker_id().into_inner(),
        num_visits: i64::try_from(session.num_visits()).map_err(SessionStoreError::persistence)?,
        created_at: session.created_at(),
        expires_at: session.expires_at(),
    })
}

pub(super) fn row_to_session(row: SessionRow) -> Result<Session, SessionStoreError> {
    Ok(Session::from_persisted(PersistedSessionData {
        id: SessionId::from_uuid(row.id),
        worker_id: WorkerId::from_uuid(row.worker_id),
        num_visits: u64::try_from(row.num_visits).map_err(SessionStoreError::persistence)?,
        created_at: row.created_at,
        expires_at: row.expires_at,
    }))
}
