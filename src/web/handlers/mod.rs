//! Request handlers, one module per resource.

pub(super) mod auth;
pub(super) mod dashboard;
pub(super) mod positions;
pub(super) mod task_types;
pub(super) mod tasks;
pub(super) mod workers;

use crate::tracker::services::FormErrors;
use axum::{
    Json,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

/// A form redisplayed with its validation errors and any extra context.
#[derive(Debug, Serialize)]
struct FormView<'a, F, C> {
    form: &'a F,
    errors: &'a FormErrors,
    #[serde(flatten)]
    context: C,
}

/// Renders `form` with `errors`; an empty error set means a fresh form.
fn form_view<F: Serialize, C: Serialize>(form: &F, errors: &FormErrors, context: C) -> Response {
    Json(FormView {
        form,
        errors,
        context,
    })
    .into_response()
}

/// `303 See Other` to `location`.
fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

/// Context for forms that need nothing besides their own fields.
#[derive(Debug, Serialize)]
struct NoContext {}

/// `GET .../delete/` confirmation payload.
#[derive(Debug, Serialize)]
struct ConfirmDelete<T> {
    object: T,
}
