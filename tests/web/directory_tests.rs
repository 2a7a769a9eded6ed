//! Workers, positions, and task types over HTTP.

use super::helpers::{PASSWORD, TestApp, app, json_body, location};
use axum::http::StatusCode;
use eyre::{Result, eyre};
use rstest::rstest;
use serde_json::Value;
use taskboard::tracker::ports::WorkerRepository;

fn usernames(page: &Value) -> Vec<String> {
    page["page"]["items"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row["username"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_list_is_ordered_and_searchable(app: TestApp) -> Result<()> {
    let developer = app.seed_position("Developer").await?;
    let (_, cookie) = app.logged_in("zoe").await?;
    app.seed_worker("sam", Some(&developer)).await?;
    app.seed_worker("alex", Some(&developer)).await?;

    let all = app.get_json("/workers/", &cookie).await?;
    assert_eq!(usernames(&all), vec!["alex", "sam", "zoe"]);

    let by_name = app
        .get_json(
            &format!("/workers/?username=SA&position_id={}", developer.id()),
            &cookie,
        )
        .await?;
    assert_eq!(usernames(&by_name), vec!["sam"]);

    let by_position = app
        .get_json(&format!("/positions/{}/workers/", developer.id()), &cookie)
        .await?;
    assert_eq!(usernames(&by_position), vec!["alex", "sam"]);
    assert_eq!(by_position["page"]["items"][0]["position"]["name"], "Developer");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn username_search_ignores_the_position_filter(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("zoe").await?;
    app.seed_worker("alex", None).await?;

    let searched = app
        .get_json("/workers/?username=alex&position_id=not-a-uuid", &cookie)
        .await?;
    assert_eq!(usernames(&searched), vec!["alex"]);
    assert_eq!(searched["position_id"], Value::Null);

    let unsearched = app
        .get("/workers/?username=&position_id=not-a-uuid", Some(&cookie))
        .await?;
    assert_eq!(unsearched.status(), StatusCode::NOT_FOUND);
    Ok(())
}

fn signup_form(confirmation: &str) -> String {
    format!(
        "username=sam&first_name=Sam&last_name=Lee&position=\
         &password1={PASSWORD}&password2={confirmation}"
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_signup_checks_passwords(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;

    let mismatch = app
        .post(
            "/workers/create/",
            Some(&cookie),
            &signup_form("other-password"),
        )
        .await?;
    assert_eq!(mismatch.status(), StatusCode::OK);
    let body = json_body(mismatch).await?;
    assert_eq!(body["errors"]["password2"][0], "The two password fields didn't match.");
    assert!(body["form"].get("password1").is_none());

    let created = app
        .post(
            "/workers/create/",
            Some(&cookie),
            &signup_form(PASSWORD),
        )
        .await?;
    assert_eq!(location(&created), Some("/workers/"));
    app.login("sam").await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_position_keeps_its_workers(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let developer = app.seed_position("Developer").await?;
    let sam = app.seed_worker("sam", Some(&developer)).await?;

    let response = app
        .post(&format!("/positions/{}/delete/", developer.id()), Some(&cookie), "")
        .await?;
    assert_eq!(location(&response), Some("/positions/"));

    let stored = app
        .store
        .find_worker(sam.id())
        .await?
        .ok_or_else(|| eyre!("worker vanished"))?;
    assert_eq!(stored.position_id(), None);
    let positions = app.get_json("/positions/", &cookie).await?;
    assert_eq!(positions["page"]["total"], 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn position_search_accepts_either_parameter(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    app.seed_position("Developer").await?;
    app.seed_position("Tester").await?;

    let by_position = app.get_json("/positions/?position=dev", &cookie).await?;
    let by_name = app.get_json("/positions/?name=test", &cookie).await?;

    assert_eq!(by_position["page"]["items"][0]["name"], "Developer");
    assert_eq!(by_position["page"]["total"], 1);
    assert_eq!(by_name["page"]["items"][0]["name"], "Tester");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_type_in_use_cannot_be_deleted(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;
    let bug = app.seed_task_type("Bug").await?;
    let unused = app.seed_task_type("Chore").await?;
    app.seed_task("Fix login", &bug).await?;

    let refused = app
        .post(&format!("/task_types/{}/delete/", bug.id()), Some(&cookie), "")
        .await?;
    assert_eq!(refused.status(), StatusCode::CONFLICT);

    let removed = app
        .post(&format!("/task_types/{}/delete/", unused.id()), Some(&cookie), "")
        .await?;
    assert_eq!(location(&removed), Some("/task_types/"));

    let remaining = app.get_json("/task_types/", &cookie).await?;
    assert_eq!(remaining["page"]["total"], 1);
    assert_eq!(remaining["page"]["items"][0]["name"], "Bug");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_task_type_name_is_rejected(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;

    let response = app
        .post("/task_types/create/", Some(&cookie), "name=++")
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["errors"]["name"][0], "This field is required.");
    let listed = app.get_json("/task_types/", &cookie).await?;
    assert_eq!(listed["page"]["total"], 0);
    Ok(())
}
