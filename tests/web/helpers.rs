//! Shared test helpers for HTTP integration tests.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use chrono::{Duration, Utc};
use eyre::{Result, WrapErr, eyre};
use rstest::fixture;
use serde_json::Value;
use std::sync::Arc;
use taskboard::{
    tracker::{
        adapters::memory::{InMemorySessionStore, InMemoryTrackerStore},
        domain::{
            EntityName, PasswordHash, PersonName, Position, Task, TaskDetails, TaskType, Username,
            Worker, WorkerProfile,
        },
        ports::{
            PositionRepository, SessionStore, TaskRepository, TaskTypeRepository, TrackerStore,
            WorkerRepository,
        },
    },
    web::{AppState, SESSION_COOKIE, build_router},
};
use tower::ServiceExt;

/// Password used for every seeded worker.
pub const PASSWORD: &str = "correct-horse-42";

/// Iteration count for seeded credentials.
const SEED_ITERATIONS: u32 = 1_000;

const BODY_LIMIT: usize = 1 << 20;

/// Router plus direct handles on its stores for seeding and inspection.
pub struct TestApp {
    router: Router,
    /// Tracker storage behind the router.
    pub store: Arc<InMemoryTrackerStore>,
    /// Session storage behind the router.
    pub sessions: Arc<InMemorySessionStore>,
}

/// Provides a fresh application for each test.
#[fixture]
pub fn app() -> TestApp {
    let store = Arc::new(InMemoryTrackerStore::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let state = AppState::new(
        Arc::clone(&store) as Arc<dyn TrackerStore>,
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        Duration::hours(1),
    );
    TestApp {
        router: build_router(state),
        store,
        sessions,
    }
}

impl TestApp {
    /// Sends one request through the router.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        form: Option<&str>,
    ) -> Result<Response<Body>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_owned())
            }
            None => Body::empty(),
        };
        let response = self.router.clone().oneshot(builder.body(body)?).await?;
        Ok(response)
    }

    /// `GET uri` with an optional session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Result<Response<Body>> {
        self.send("GET", uri, cookie, None).await
    }

    /// `POST uri` with a urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built.
    pub async fn post(
        &self,
        uri: &str,
        cookie: Option<&str>,
        form: &str,
    ) -> Result<Response<Body>> {
        self.send("POST", uri, cookie, Some(form)).await
    }

    /// `GET uri` expecting `200 OK` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error for any other status or a non-JSON body.
    pub async fn get_json(&self, uri: &str, cookie: &str) -> Result<Value> {
        let response = self.get(uri, Some(cookie)).await?;
        eyre::ensure!(
            response.status() == StatusCode::OK,
            "GET {uri} returned {}",
            response.status()
        );
        json_body(response).await
    }

    /// Logs in as `username` and returns the `Cookie` header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the login does not set a session cookie.
    pub async fn login(&self, username: &str) -> Result<String> {
        let response = self
            .post("/login", None, &format!("username={username}&password={PASSWORD}"))
            .await?;
        eyre::ensure!(
            response.status() == StatusCode::SEE_OTHER,
            "login returned {}",
            response.status()
        );
        session_cookie(&response).ok_or_else(|| eyre!("login set no session cookie"))
    }

    /// Seeds a worker and logs them in.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding or login fails.
    pub async fn logged_in(&self, username: &str) -> Result<(Worker, String)> {
        let worker = self.seed_worker(username, None).await?;
        let cookie = self.login(username).await?;
        Ok((worker, cookie))
    }

    /// Stores a worker with [`PASSWORD`].
    ///
    /// # Errors
    ///
    /// Returns an error if the worker is invalid or cannot be stored.
    pub async fn seed_worker(&self, username: &str, position: Option<&Position>) -> Result<Worker> {
        let worker = Worker::new(
            WorkerProfile {
                username: Username::new(username)?,
                first_name: PersonName::new("Test")?,
                last_name: PersonName::new(username)?,
                position_id: position.map(Position::id),
            },
            PasswordHash::derive_with_iterations(PASSWORD, SEED_ITERATIONS),
        );
        self.store.insert_worker(&worker).await?;
        Ok(worker)
    }

    /// Stores a position.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub async fn seed_position(&self, name: &str) -> Result<Position> {
        let position = Position::new(EntityName::new(name)?);
        self.store.insert_position(&position).await?;
        Ok(position)
    }

    /// Stores a task type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub async fn seed_task_type(&self, name: &str) -> Result<TaskType> {
        let task_type = TaskType::new(EntityName::new(name)?);
        self.store.insert_task_type(&task_type).await?;
        Ok(task_type)
    }

    /// Stores a `todo` task due tomorrow.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub async fn seed_task(&self, name: &str, task_type: &TaskType) -> Result<Task> {
        let task = Task::new(TaskDetails::new(
            EntityName::new(name)?,
            Utc::now() + Duration::days(1),
            task_type.id(),
        ));
        self.store.insert_task(&task).await?;
        Ok(task)
    }
}

/// Extracts `name=value` of the session cookie from `Set-Cookie`.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(SESSION_COOKIE))
        .map(str::to_owned)
}

/// The `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Reads the body as JSON.
///
/// # Errors
///
/// Returns an error if the body cannot be read or is not JSON.
pub async fn json_body(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await?;
    serde_json::from_slice(&bytes).wrap_err("response body is not JSON")
}

/// Names of the tasks in one board column.
pub fn column_names(board: &Value, column: &str) -> Vec<String> {
    board[column]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
