//! Worker accounts, search precedence, and task grouping.

use super::fixtures::{PASSWORD, seed_position, seed_task, seed_task_type, seed_worker, task};
use crate::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{PageRequest, PositionId, Task, TaskStatus},
    ports::{TaskRepository, WorkerFilter},
    services::{WorkerCreateForm, WorkerForm, WorkerService, WorkerServiceError},
};
use eyre::{Result, bail};
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn store() -> Arc<InMemoryTrackerStore> {
    Arc::new(InMemoryTrackerStore::new())
}

fn create_form(username: &str, password1: &str, password2: &str) -> WorkerCreateForm {
    WorkerCreateForm {
        profile: WorkerForm {
            username: username.to_owned(),
            first_name: "Alex".to_owned(),
            last_name: "Kim".to_owned(),
            position: String::new(),
        },
        password1: password1.to_owned(),
        password2: password2.to_owned(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_worker_can_log_in(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    let developer = seed_position(&store, "Developer").await?;
    let service = WorkerService::new(Arc::clone(&store));
    let mut form = create_form("alex", PASSWORD, PASSWORD);
    form.profile.position = developer.id().to_string();

    let worker = service.create(&form).await?;

    assert!(worker.check_password(PASSWORD));
    assert_eq!(worker.position_id(), Some(developer.id()));
    let detail = service.detail(worker.id()).await?;
    assert_eq!(detail.display, "Alex Kim (Developer)");
    assert!(detail.tasks.no_tasks);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_username_is_a_field_error(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    seed_worker(&store, "alex", None).await?;
    let service = WorkerService::new(Arc::clone(&store));

    let result = service.create(&create_form("alex", PASSWORD, PASSWORD)).await;

    let Err(WorkerServiceError::Invalid(errors)) = result else {
        bail!("expected a validation error, got {result:?}");
    };
    assert_eq!(
        errors.field("username"),
        ["A user with that username already exists."]
    );
    Ok(())
}

#[rstest]
#[case(PASSWORD, "different-password", "The two password fields didn't match.")]
#[case("short", "short", "This password is too short. It must contain at least 8 characters.")]
#[case("12345678901", "12345678901", "This password is entirely numeric.")]
#[case("alexander", "alexander", "The password is too similar to the username.")]
#[tokio::test(flavor = "multi_thread")]
async fn password_rules_report_on_confirmation(
    store: Arc<InMemoryTrackerStore>,
    #[case] password1: &str,
    #[case] password2: &str,
    #[case] message: &str,
) -> Result<()> {
    let service = WorkerService::new(Arc::clone(&store));

    let result = service
        .create(&create_form("alexander", password1, password2))
        .await;

    let Err(WorkerServiceError::Invalid(errors)) = result else {
        bail!("expected a validation error, got {result:?}");
    };
    assert!(
        errors.field("password2").iter().any(|m| m == message),
        "missing {message:?} in {errors}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_position_is_a_field_error(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    let service = WorkerService::new(Arc::clone(&store));
    let mut form = create_form("alex", PASSWORD, PASSWORD);
    form.profile.position = PositionId::new().to_string();

    let result = service.create(&form).await;

    let Err(WorkerServiceError::Invalid(errors)) = result else {
        bail!("expected a validation error, got {result:?}");
    };
    assert!(errors.has("position"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_keeps_password_and_own_username(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    let worker = seed_worker(&store, "alex", None).await?;
    let service = WorkerService::new(Arc::clone(&store));
    let mut form = WorkerForm::from_worker(&worker);
    form.first_name = "Alexandra".to_owned();

    let updated = service.update(worker.id(), &form).await?;

    assert_eq!(updated.first_name().as_str(), "Alexandra");
    assert_eq!(updated.username(), worker.username());
    assert!(updated.check_password(PASSWORD));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn username_search_wins_over_position(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    let developer = seed_position(&store, "Developer").await?;
    let tester = seed_position(&store, "Tester").await?;
    seed_worker(&store, "alex", Some(&tester)).await?;
    seed_worker(&store, "Alexis", Some(&developer)).await?;
    seed_worker(&store, "sam", Some(&developer)).await?;
    let service = WorkerService::new(Arc::clone(&store));

    let by_name = service
        .list(
            &WorkerFilter::from_query(Some("ALEX"), Some(developer.id())),
            PageRequest::default(),
        )
        .await?;
    let names: Vec<&str> = by_name
        .items
        .iter()
        .map(|row| row.worker.username().as_str())
        .collect();
    assert_eq!(names, vec!["Alexis", "alex"]);

    let by_position = service
        .list(
            &WorkerFilter::from_query(Some("  "), Some(developer.id())),
            PageRequest::default(),
        )
        .await?;
    assert_eq!(by_position.total, 2);
    assert!(
        by_position
            .items
            .iter()
            .all(|row| row.position.as_ref().map(|p| p.id()) == Some(developer.id()))
    );

    let none = service
        .list(&WorkerFilter::from_query(Some("zed"), None), PageRequest::default())
        .await?;
    assert!(none.items.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn detail_groups_tasks_by_completion(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    let bug = seed_task_type(&store, "Bug").await?;
    let worker = seed_worker(&store, "alex", None).await?;
    for (name, status) in [("open", TaskStatus::Todo), ("closed", TaskStatus::Done)] {
        let details = task(name, &bug, 1, status)?
            .details()
            .with_assignees([worker.id()]);
        seed_task(&store, Task::new(details)).await?;
    }
    seed_task(&store, task("unassigned", &bug, 1, TaskStatus::Todo)?).await?;
    let service = WorkerService::new(Arc::clone(&store));

    let detail = service.detail(worker.id()).await?;

    assert_eq!(detail.tasks.incomplete.len(), 1);
    assert_eq!(detail.tasks.completed.len(), 1);
    assert!(!detail.tasks.no_tasks);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_worker_removes_assignments(store: Arc<InMemoryTrackerStore>) -> Result<()> {
    let bug = seed_task_type(&store, "Bug").await?;
    let worker = seed_worker(&store, "alex", None).await?;
    let details = task("Fix bug", &bug, 1, TaskStatus::Todo)?
        .details()
        .with_assignees([worker.id()]);
    let assigned = seed_task(&store, Task::new(details)).await?;
    let service = WorkerService::new(Arc::clone(&store));

    service.delete(worker.id()).await?;

    let reloaded = store.find_task(assigned.id()).await?;
    assert!(reloaded.is_some_and(|t| t.assignees().is_empty()));
    assert!(matches!(
        service.find(worker.id()).await,
        Err(WorkerServiceError::NotFound(_))
    ));
    Ok(())
}
