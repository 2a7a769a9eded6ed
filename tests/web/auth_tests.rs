//! Login, logout, redirects, and the dashboard.

use super::helpers::{PASSWORD, TestApp, app, json_body, location, session_cookie};
use axum::http::StatusCode;
use eyre::Result;
use rstest::rstest;
use taskboard::tracker::{domain::SessionId, ports::SessionStore};

#[rstest]
#[case("/")]
#[case("/tasks/?name=fix")]
#[case("/workers/")]
#[case("/task_types/create/")]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_requests_redirect_to_login(app: TestApp, #[case] uri: &str) -> Result<()> {
    let response = app.get(uri, None).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = format!("/login?next={}", urlencoding::encode(uri));
    assert_eq!(location(&response), Some(expected.as_str()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_needs_no_session(app: TestApp) -> Result<()> {
    let response = app.get("/health", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[rstest]
#[case("/tasks/?name=fix", "/tasks/?name=fix")]
#[case("", "/")]
#[case("//evil.example/", "/")]
#[case("https://evil.example/", "/")]
#[tokio::test(flavor = "multi_thread")]
async fn login_follows_local_next_only(
    app: TestApp,
    #[case] next: &str,
    #[case] expected: &str,
) -> Result<()> {
    app.seed_worker("alex", None).await?;
    let form = format!(
        "username=alex&password={PASSWORD}&next={}",
        urlencoding::encode(next)
    );

    let response = app.post("/login", None, &form).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some(expected));
    assert!(session_cookie(&response).is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bad_credentials_redisplay_the_form(app: TestApp) -> Result<()> {
    app.seed_worker("alex", None).await?;

    let response = app
        .post("/login", None, "username=alex&password=wrong-password")
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    let body = json_body(response).await?;
    assert_eq!(body["form"]["username"], "alex");
    assert!(body["errors"]["__all__"].is_array());
    assert!(body["form"].get("password").is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dashboard_counts_visits_per_session(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;

    let first = app.get_json("/", &cookie).await?;
    let second = app.get_json("/", &cookie).await?;
    let other_session = app.login("alex").await?;
    let fresh = app.get_json("/", &other_session).await?;

    assert_eq!(first["num_visits"], 1);
    assert_eq!(second["num_visits"], 2);
    assert_eq!(fresh["num_visits"], 1);
    assert_eq!(second["num_workers"], 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn logout_ends_the_session(app: TestApp) -> Result<()> {
    let (_, cookie) = app.logged_in("alex").await?;

    let response = app.post("/logout", Some(&cookie), "").await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let after = app.get("/", Some(&cookie)).await?;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_worker_loses_their_session(app: TestApp) -> Result<()> {
    let (worker, cookie) = app.logged_in("alex").await?;
    let (_, admin) = app.logged_in("sam").await?;

    let response = app
        .post(&format!("/workers/{}/delete/", worker.id()), Some(&admin), "")
        .await?;
    assert_eq!(location(&response), Some("/workers/"));

    let after = app.get("/", Some(&cookie)).await?;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn logging_in_again_retires_the_cookie_session(app: TestApp) -> Result<()> {
    let (_, first) = app.logged_in("alex").await?;

    let response = app
        .post(
            "/login",
            Some(&first),
            &format!("username=alex&password={PASSWORD}"),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let second = session_cookie(&response).ok_or_else(|| eyre::eyre!("no session cookie"))?;
    assert_ne!(first, second);

    let first_id: SessionId = first
        .split_once('=')
        .map(|(_, id)| id)
        .unwrap_or_default()
        .parse()?;
    assert!(app.sessions.find_session(first_id).await?.is_none());

    let stale = app.get("/", Some(&first)).await?;
    assert_eq!(stale.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&stale), Some("/login?next=%2F"));
    let fresh = app.get("/", Some(&second)).await?;
    assert_eq!(fresh.status(), StatusCode::OK);
    Ok(())
}
