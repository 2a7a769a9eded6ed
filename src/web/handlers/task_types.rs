//! Task type list and CRUD.

use super::{ConfirmDelete, NoContext, form_view, see_other};
use crate::tracker::{
    domain::{Page, PageRequest, TaskTypeId, TaskTypeSummary},
    services::{FormErrors, NameForm, TaskTypeServiceError},
};
use crate::web::{
    AppState, WebError,
    forms::{FormData, parse_id},
    session::Actor,
};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Search {
    name: String,
}

#[derive(Debug, Serialize)]
struct TaskTypeListView {
    search: Search,
    page: Page<TaskTypeSummary>,
}

/// `GET /task_types/`
pub(crate) async fn list(
    _actor: Actor,
    State(state): State<AppState>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let name = query.text("name");
    let request = PageRequest::parse(query.get("page"))?;
    let page = state.task_types().list(Some(name.as_str()), request).await?;
    Ok(Json(TaskTypeListView {
        search: Search { name },
        page,
    })
    .into_response())
}

/// `GET /task_types/create/`
pub(crate) async fn create_form(_actor: Actor) -> Response {
    form_view(&NameForm::default(), &FormErrors::new(), NoContext {})
}

/// `POST /task_types/create/`
pub(crate) async fn create(
    _actor: Actor,
    State(state): State<AppState>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let form = NameForm::new(data.text("name"));
    match state.task_types().create(&form).await {
        Ok(_) => Ok(see_other("/task_types/")),
        Err(TaskTypeServiceError::Invalid(errors)) => Ok(form_view(&form, &errors, NoContext {})),
        Err(err) => Err(err.into()),
    }
}

/// `GET /task_types/{id}/update/`
pub(crate) async fn update_form(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let task_type = state.task_types().find(parse_id(&raw_id)?).await?;
    Ok(form_view(
        &NameForm::new(task_type.name().as_str()),
        &FormErrors::new(),
        NoContext {},
    ))
}

/// `POST /task_types/{id}/update/`
pub(crate) async fn update(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let id: TaskTypeId = parse_id(&raw_id)?;
    let form = NameForm::new(data.text("name"));
    match state.task_types().update(id, &form).await {
        Ok(_) => Ok(see_other("/task_types/")),
        Err(TaskTypeServiceError::Invalid(errors)) => Ok(form_view(&form, &errors, NoContext {})),
        Err(err) => Err(err.into()),
    }
}

/// `GET /task_types/{id}/delete/`
pub(crate) async fn confirm_delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let object = state.task_types().find(parse_id(&raw_id)?).await?;
    Ok(Json(ConfirmDelete { object }).into_response())
}

/// `POST /task_types/{id}/delete/`
///
/// Refused with 409 while any task still uses the type.
pub(crate) async fn delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    state.task_types().delete(parse_id(&raw_id)?).await?;
    Ok(see_other("/task_types/"))
}
