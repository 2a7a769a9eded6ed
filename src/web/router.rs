//! Route table.

use super::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Builds the HTTP router.
///
/// Every route except `/health` and the login/logout pair requires a live
/// session.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    use handlers::{auth, dashboard, positions, task_types, tasks, workers};

    Router::new()
        .route("/", get(dashboard::home))
        .route("/health", get(dashboard::health))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        // Tasks
        .route("/tasks/", get(tasks::board))
        .route("/tasks/status/{status}/", get(tasks::by_status))
        .route("/tasks/create/", get(tasks::create_form).post(tasks::create))
        .route("/tasks/{id}/", get(tasks::detail))
        .route("/tasks/{id}/update/", get(tasks::update_form).post(tasks::update))
        .route(
            "/tasks/{id}/delete/",
            get(tasks::confirm_delete).post(tasks::delete),
        )
        .route("/tasks/{id}/toggle-assign/", post(tasks::toggle_assign))
        .route("/tasks/{id}/set-status/", post(tasks::set_status))
        .route(
            "/tasks/{id}/manage-users/",
            get(tasks::assignees_form).post(tasks::set_assignees),
        )
        // Workers
        .route("/workers/", get(workers::list))
        .route(
            "/workers/create/",
            get(workers::create_form).post(workers::create),
        )
        .route("/workers/{id}/", get(workers::detail))
        .route(
            "/workers/{id}/update/",
            get(workers::update_form).post(workers::update),
        )
        .route(
            "/workers/{id}/delete/",
            get(workers::confirm_delete).post(workers::delete),
        )
        // Positions
        .route("/positions/", get(positions::list))
        .route(
            "/positions/create/",
            get(positions::create_form).post(positions::create),
        )
        .route("/positions/{id}/workers/", get(workers::list_for_position))
        .route(
            "/positions/{id}/update/",
            get(positions::update_form).post(positions::update),
        )
        .route(
            "/positions/{id}/delete/",
            get(positions::confirm_delete).post(positions::delete),
        )
        // Task types
        .route("/task_types/", get(task_types::list))
        .route(
            "/task_types/create/",
            get(task_types::create_form).post(task_types::create),
        )
        .route("/task_types/{id}/tasks/", get(tasks::board_for_type))
        .route(
            "/task_types/{id}/update/",
            get(task_types::update_form).post(task_types::update),
        )
        .route(
            "/task_types/{id}/delete/",
            get(task_types::confirm_delete).post(task_types::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
