//! Storage behaviour every tracker adapter must share.
//!
//! Each check takes an empty store and fails with a descriptive report.

use chrono::{Duration, TimeZone, Utc};
use eyre::{Result, ensure, eyre};
use mockable::DefaultClock;
use std::collections::BTreeSet;
use std::sync::Arc;
use taskboard::tracker::{
    domain::{
        AssignmentChange, EntityName, PageRequest, PasswordHash, PersistedSessionData, PersonName,
        Position, Session, SessionId, Task, TaskDetails, TaskStatus, TaskType, Username, Worker,
        WorkerId, WorkerProfile,
    },
    ports::{
        SessionStore, SessionStoreError, TaskFilter, TrackerRepositoryError, TrackerStore,
        WorkerFilter,
    },
    services::AuthService,
};

const PASSWORD: &str = "correct-horse-42";

async fn position<S: TrackerStore + ?Sized>(store: &S, name: &str) -> Result<Position> {
    let position = Position::new(EntityName::new(name)?);
    store.insert_position(&position).await?;
    Ok(position)
}

async fn task_type<S: TrackerStore + ?Sized>(store: &S, name: &str) -> Result<TaskType> {
    let task_type = TaskType::new(EntityName::new(name)?);
    store.insert_task_type(&task_type).await?;
    Ok(task_type)
}

fn new_worker(username: &str, position: Option<&Position>) -> Result<Worker> {
    Ok(Worker::new(
        WorkerProfile {
            username: Username::new(username)?,
            first_name: PersonName::new("Test")?,
            last_name: PersonName::new(username)?,
            position_id: position.map(Position::id),
        },
        PasswordHash::derive_with_iterations(PASSWORD, 1_000),
    ))
}

async fn worker<S: TrackerStore + ?Sized>(
    store: &S,
    username: &str,
    position: Option<&Position>,
) -> Result<Worker> {
    let worker = new_worker(username, position)?;
    store.insert_worker(&worker).await?;
    Ok(worker)
}

fn new_task(name: &str, task_type: &TaskType, days: i64) -> Result<Task> {
    let base = Utc
        .with_ymd_and_hms(2030, 1, 1, 12, 0, 0)
        .single()
        .ok_or_else(|| eyre!("invalid base time"))?;
    Ok(Task::new(TaskDetails::new(
        EntityName::new(name)?,
        base + Duration::days(days),
        task_type.id(),
    )))
}

async fn task<S: TrackerStore + ?Sized>(
    store: &S,
    name: &str,
    task_type: &TaskType,
    days: i64,
) -> Result<Task> {
    let task = new_task(name, task_type, days)?;
    store.insert_task(&task).await?;
    Ok(task)
}

fn names(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.name().as_str()).collect()
}

/// Tasks come back in deadline order and honour filters and windows.
pub async fn tasks_are_ordered_and_filtered<S: TrackerStore + ?Sized>(store: &S) -> Result<()> {
    let bug = task_type(store, "Bug").await?;
    let feature = task_type(store, "Feature").await?;
    task(store, "Fix crash", &bug, 3).await?;
    task(store, "fix typo", &bug, 1).await?;
    let export = task(store, "Add export", &feature, 2).await?;
    store.set_task_status(export.id(), TaskStatus::Done).await?;

    let all = store.list_tasks(&TaskFilter::all(), None).await?;
    ensure!(
        names(&all) == ["fix typo", "Add export", "Fix crash"],
        "unexpected order {:?}",
        names(&all)
    );

    let fixes = TaskFilter::all().with_name(Some("FIX"));
    ensure!(store.count_tasks(&fixes).await? == 2, "name filter should match two");
    let features = TaskFilter::all().with_task_type(Some(feature.id()));
    ensure!(names(&store.list_tasks(&features, None).await?) == ["Add export"]);
    let done = TaskFilter::all().with_status(TaskStatus::Done);
    ensure!(store.count_tasks(&done).await? == 1, "status filter should match one");

    let window = PageRequest::default().window(store.count_tasks(&fixes).await?)?;
    let page = store.list_tasks(&fixes, Some(window)).await?;
    ensure!(names(&page) == ["fix typo", "Fix crash"], "window lost rows");
    Ok(())
}

/// Task names and usernames are unique; everything else may repeat.
pub async fn uniqueness_is_enforced<S: TrackerStore + ?Sized>(store: &S) -> Result<()> {
    let bug = task_type(store, "Bug").await?;
    task_type(store, "Bug").await?;
    position(store, "Developer").await?;
    position(store, "Developer").await?;
    let original = task(store, "Fix crash", &bug, 1).await?;

    let duplicate = store.insert_task(&new_task("Fix crash", &bug, 2)?).await;
    ensure!(
        matches!(duplicate, Err(TrackerRepositoryError::DuplicateTaskName(_))),
        "expected duplicate task name, got {duplicate:?}"
    );
    let name = EntityName::new("Fix crash")?;
    ensure!(store.task_name_taken(&name, None).await?);
    ensure!(!store.task_name_taken(&name, Some(original.id())).await?);

    worker(store, "alex", None).await?;
    let duplicate = store.insert_worker(&new_worker("alex", None)?).await;
    ensure!(
        matches!(duplicate, Err(TrackerRepositoryError::DuplicateUsername(_))),
        "expected duplicate username, got {duplicate:?}"
    );
    ensure!(store.count_task_types(None).await? == 2, "task type names may repeat");
    ensure!(store.count_positions(Some("dev")).await? == 2, "position names may repeat");
    Ok(())
}

/// Deleting a position clears it from workers; task types in use stay.
pub async fn references_are_maintained<S: TrackerStore + ?Sized>(store: &S) -> Result<()> {
    let developer = position(store, "Developer").await?;
    let alex = worker(store, "alex", Some(&developer)).await?;
    let bug = task_type(store, "Bug").await?;
    let crash = task(store, "Fix crash", &bug, 1).await?;

    store.delete_position(developer.id()).await?;
    let reloaded = store
        .find_worker(alex.id())
        .await?
        .ok_or_else(|| eyre!("worker removed with position"))?;
    ensure!(reloaded.position_id().is_none(), "position not cleared");

    let refused = store.delete_task_type(bug.id()).await;
    ensure!(
        matches!(refused, Err(TrackerRepositoryError::TaskTypeInUse { task_count: 1, .. })),
        "expected in-use refusal, got {refused:?}"
    );
    store.delete_task(crash.id()).await?;
    store.delete_task_type(bug.id()).await?;
    ensure!(store.find_task_type(bug.id()).await?.is_none());

    let missing = store.delete_task(crash.id()).await;
    ensure!(
        matches!(missing, Err(TrackerRepositoryError::TaskNotFound(_))),
        "expected not found, got {missing:?}"
    );
    Ok(())
}

/// Toggling, replacing, and worker deletion keep assignments consistent.
pub async fn assignments_stay_consistent<S: TrackerStore + ?Sized>(store: &S) -> Result<()> {
    let bug = task_type(store, "Bug").await?;
    let crash = task(store, "Fix crash", &bug, 1).await?;
    let alex = worker(store, "alex", None).await?;
    let sam = worker(store, "sam", None).await?;

    ensure!(store.toggle_assignee(crash.id(), alex.id()).await? == AssignmentChange::Assigned);
    ensure!(store.toggle_assignee(crash.id(), alex.id()).await? == AssignmentChange::Unassigned);

    let both = BTreeSet::from([alex.id(), sam.id()]);
    store.set_assignees(crash.id(), &both).await?;
    let with_stranger = BTreeSet::from([alex.id(), WorkerId::new()]);
    let rejected = store.set_assignees(crash.id(), &with_stranger).await;
    ensure!(
        matches!(rejected, Err(TrackerRepositoryError::WorkerNotFound(_))),
        "expected unknown worker, got {rejected:?}"
    );
    let assigned = |task: Option<Task>| task.map(|task| task.assignees().clone());
    ensure!(
        assigned(store.find_task(crash.id()).await?) == Some(both),
        "failed replacement changed assignees"
    );

    store.delete_worker(sam.id()).await?;
    ensure!(
        assigned(store.find_task(crash.id()).await?) == Some(BTreeSet::from([alex.id()])),
        "deleted worker still assigned"
    );
    let filter = TaskFilter::all().with_assignee(alex.id());
    ensure!(store.count_tasks(&filter).await? == 1, "assignee filter lost the task");
    Ok(())
}

/// Workers list in username order; username search ignores case.
pub async fn workers_are_ordered_and_searchable<S>(store: &S) -> Result<()>
where
    S: TrackerStore + ?Sized,
{
    let developer = position(store, "Developer").await?;
    worker(store, "sam", Some(&developer)).await?;
    worker(store, "alex", None).await?;
    worker(store, "alexis", Some(&developer)).await?;

    let window = PageRequest::default().window(3)?;
    let rows = store.workers_with_positions(&WorkerFilter::All, window).await?;
    let usernames: Vec<&str> = rows
        .iter()
        .map(|row| row.worker.username().as_str())
        .collect();
    ensure!(usernames == ["alex", "alexis", "sam"], "unexpected order {usernames:?}");

    let search = WorkerFilter::from_query(Some("ALEX"), None);
    ensure!(store.count_workers(&search).await? == 2, "username search should match two");
    let by_position = WorkerFilter::Position(developer.id());
    ensure!(store.count_workers(&by_position).await? == 2, "position filter should match two");
    Ok(())
}

/// Sessions count visits until deleted.
pub async fn sessions_count_visits<S, T>(store: &S, sessions: &T) -> Result<()>
where
    S: TrackerStore + ?Sized,
    T: SessionStore + ?Sized,
{
    let alex = worker(store, "alex", None).await?;
    let session = Session::start(alex.id(), Duration::hours(1), &DefaultClock);
    sessions.insert_session(&session).await?;

    ensure!(sessions.record_visit(session.id()).await? == 1);
    ensure!(sessions.record_visit(session.id()).await? == 2);
    let stored = sessions
        .find_session(session.id())
        .await?
        .ok_or_else(|| eyre!("session not stored"))?;
    ensure!(stored.worker_id() == alex.id(), "session lost its worker");

    sessions.delete_session(session.id()).await?;
    ensure!(sessions.find_session(session.id()).await?.is_none());
    let missing = sessions.record_visit(session.id()).await;
    ensure!(
        matches!(missing, Err(SessionStoreError::NotFound(_))),
        "expected missing session, got {missing:?}"
    );
    Ok(())
}

fn expired_session(worker_id: WorkerId, days_ago: i64) -> Session {
    let expired_at = Utc::now() - Duration::days(days_ago);
    Session::from_persisted(PersistedSessionData {
        id: SessionId::new(),
        worker_id,
        num_visits: 4,
        created_at: expired_at - Duration::days(14),
        expires_at: expired_at,
    })
}

/// Sweeping removes expired sessions only.
pub async fn expired_sessions_are_purged<S, T>(store: &S, sessions: &T) -> Result<()>
where
    S: TrackerStore + ?Sized,
    T: SessionStore + ?Sized,
{
    let alex = worker(store, "alex", None).await?;
    let stale: Vec<Session> = (14..17)
        .map(|days_ago| expired_session(alex.id(), days_ago))
        .collect();
    for session in &stale {
        sessions.insert_session(session).await?;
    }
    let live = Session::start(alex.id(), Duration::hours(1), &DefaultClock);
    sessions.insert_session(&live).await?;

    let removed = sessions.purge_expired(Utc::now()).await?;
    ensure!(removed == 3, "expected 3 expired sessions removed, got {removed}");
    for session in &stale {
        ensure!(
            sessions.find_session(session.id()).await?.is_none(),
            "expired session {} survived the sweep",
            session.id()
        );
    }
    ensure!(
        sessions.find_session(live.id()).await?.is_some(),
        "live session was swept"
    );
    let again = sessions.purge_expired(Utc::now()).await?;
    ensure!(again == 0, "second sweep removed {again} sessions");
    Ok(())
}

/// Logging in retires the session already held and sweeps expired ones.
pub async fn login_replaces_the_held_session<S, T>(store: Arc<S>, sessions: Arc<T>) -> Result<()>
where
    S: TrackerStore + ?Sized,
    T: SessionStore + ?Sized,
{
    let alex = worker(&*store, "alex", None).await?;
    for days_ago in 14..17 {
        sessions
            .insert_session(&expired_session(alex.id(), days_ago))
            .await?;
    }
    let auth = AuthService::new(
        store,
        Arc::clone(&sessions),
        Arc::new(DefaultClock),
        Duration::days(14),
    );

    let first = auth.login("alex", PASSWORD, None).await?;
    let second = auth.login("alex", PASSWORD, Some(first.id())).await?;

    ensure!(
        sessions.find_session(first.id()).await?.is_none(),
        "the replaced session is still stored"
    );
    ensure!(
        sessions.find_session(second.id()).await?.is_some(),
        "the new session was not stored"
    );
    let leftover = sessions.purge_expired(Utc::now()).await?;
    ensure!(leftover == 0, "{leftover} expired sessions outlived the logins");
    Ok(())
}
