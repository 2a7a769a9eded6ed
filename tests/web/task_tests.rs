//! Task board, CRUD, status changes, and assignments over HTTP.

use super::helpers::{TestApp, app, column_names, json_body, location};
use axum::http::StatusCode;
use eyre::{Result, eyre};
use rstest::rstest;
use taskboard::tracker::{domain::TaskStatus, ports::TaskRepository};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_lands_in_todo(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    let form = format!(
        "name=Fix+login&description=&deadline=2030-01-15&priority=&status=&task_type={}",
        bug.id()
    );

    let response = app.post("/tasks/create/", Some(&cookie), &form).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/tasks/"));
    let board = app.get_json("/tasks/", &cookie).await?;
    assert_eq!(column_names(&board, "todo"), vec!["Fix login"]);
    assert!(column_names(&board, "done").is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_task_form_is_echoed_with_errors(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    app.seed_task_type("Bug").await?;

    let response = app
        .post(
            "/tasks/create/",
            Some(&cookie),
            "name=Draft&deadline=someday&status=later&task_type=",
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["form"]["name"], "Draft");
    for field in ["deadline", "status", "task_type"] {
        assert!(body["errors"][field].is_array(), "missing error for {field}");
    }
    assert!(body["choices"].is_object());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_search_is_case_insensitive(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    app.seed_task("Fix login", &bug).await?;
    app.seed_task("Write docs", &bug).await?;

    let board = app.get_json("/tasks/?name=FIX", &cookie).await?;

    assert_eq!(column_names(&board, "todo"), vec!["Fix login"]);
    assert_eq!(board["search"]["name"], "FIX");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_type_board_only_shows_that_type(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    let feature = app.seed_task_type("Feature").await?;
    app.seed_task("Fix login", &bug).await?;
    app.seed_task("Add export", &feature).await?;

    let board = app
        .get_json(&format!("/task_types/{}/tasks/", feature.id()), &cookie)
        .await?;

    assert_eq!(column_names(&board, "todo"), vec!["Add export"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_type_board_is_empty(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    app.seed_task("Fix login", &bug).await?;

    let board = app
        .get_json(
            "/task_types/00000000-0000-0000-0000-000000000000/tasks/",
            &cookie,
        )
        .await?;
    assert!(column_names(&board, "todo").is_empty());

    let malformed = app.get("/task_types/bogus/tasks/", Some(&cookie)).await?;
    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[rstest]
#[case("in_progress", TaskStatus::InProgress)]
#[case("done", TaskStatus::Done)]
#[case("someday", TaskStatus::Todo)]
#[tokio::test(flavor = "multi_thread")]
async fn set_status_ignores_unknown_keys(
    app: TestApp,
    #[case] submitted: &str,
    #[case] expected: TaskStatus,
) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    let task = app.seed_task("Fix login", &bug).await?;

    let response = app
        .post(
            &format!("/tasks/{}/set-status/", task.id()),
            Some(&cookie),
            &format!("status={submitted}"),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let detail_path = format!("/tasks/{}/", task.id());
    assert_eq!(location(&response), Some(detail_path.as_str()));
    let stored = app
        .store
        .find_task(task.id())
        .await?
        .ok_or_else(|| eyre!("task vanished"))?;
    assert_eq!(stored.status(), expected);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn toggle_assign_flips_membership(app: TestApp) -> Result<()> {
    let (worker, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    let task = app.seed_task("Fix login", &bug).await?;
    let toggle = format!("/tasks/{}/toggle-assign/", task.id());

    app.post(&toggle, Some(&cookie), "").await?;
    let assigned = app
        .get_json(&format!("/tasks/{}/", task.id()), &cookie)
        .await?;
    app.post(&toggle, Some(&cookie), "").await?;
    let unassigned = app
        .get_json(&format!("/tasks/{}/", task.id()), &cookie)
        .await?;

    assert_eq!(assigned["assignees"][0]["username"], "alex");
    assert_eq!(assigned["task"]["assignees"][0], worker.id().to_string());
    assert_eq!(unassigned["assignees"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manage_users_replaces_assignees(app: TestApp) -> Result<()> {
    let (alex, cookie) = app.logged_in("alex").await?;
    let sam = app.seed_worker("sam", None).await?;
    let bug = app.seed_task_type("Bug").await?;
    let task = app.seed_task("Fix login", &bug).await?;
    let path = format!("/tasks/{}/manage-users/", task.id());

    let response = app
        .post(
            &path,
            Some(&cookie),
            &format!("users={}&users={}", alex.id(), sam.id()),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let selection = app.get_json(&path, &cookie).await?;
    assert_eq!(selection["selected"].as_array().map(Vec::len), Some(2));

    let rejected = app.post(&path, Some(&cookie), "users=nobody").await?;
    assert_eq!(rejected.status(), StatusCode::OK);
    let body = json_body(rejected).await?;
    assert!(body["errors"]["users"].is_array());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_task_is_gone(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    let task = app.seed_task("Fix login", &bug).await?;

    let response = app
        .post(&format!("/tasks/{}/delete/", task.id()), Some(&cookie), "")
        .await?;
    assert_eq!(location(&response), Some("/tasks/"));

    let detail = app.get(&format!("/tasks/{}/", task.id()), Some(&cookie)).await?;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[rstest]
#[case("/tasks/not-a-uuid/")]
#[case("/tasks/00000000-0000-0000-0000-000000000000/")]
#[case("/tasks/?task_type_id=bogus")]
#[case("/workers/42/")]
#[case("/positions/nope/update/")]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_or_malformed_ids_are_not_found(app: TestApp, #[case] uri: &str) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;

    let response = app.get(uri, Some(&cookie)).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_listing_pages_and_flags_overdue(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    app.seed_task("Fix login", &bug).await?;

    let listing = app.get_json("/tasks/status/todo/", &cookie).await?;
    assert_eq!(listing["page"]["total"], 1);
    assert_eq!(listing["page"]["items"][0]["is_overdue"], false);

    let unknown = app.get_json("/tasks/status/someday/", &cookie).await?;
    assert_eq!(unknown["title"], "Tasks");
    assert_eq!(unknown["page"]["total"], 0);

    let past_end = app.get("/tasks/status/todo/?page=9", Some(&cookie)).await?;
    assert_eq!(past_end.status(), StatusCode::NOT_FOUND);
    Ok(())
}
