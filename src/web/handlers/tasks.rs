//! Task board, task CRUD, status changes, and assignments.

use super::{ConfirmDelete, form_view, see_other};
use crate::tracker::{
    domain::{PageRequest, StatusBoard, TaskId, TaskTypeId},
    ports::TaskFilter,
    services::{AssigneeSelection, FormErrors, TaskForm, TaskFormChoices, TaskServiceError},
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
struct BoardView {
    search: Search,
    task_type_id: Option<TaskTypeId>,
    #[serde(flatten)]
    board: StatusBoard,
}

#[derive(Debug, Serialize)]
struct Choices {
    choices: TaskFormChoices,
}

#[derive(Debug, Serialize)]
struct SelectionView {
    #[serde(flatten)]
    selection: AssigneeSelection,
    errors: FormErrors,
}

fn task_form(data: &FormData) -> TaskForm {
    TaskForm {
        name: data.text("name"),
        description: data.text("description"),
        deadline: data.text("deadline"),
        is_completed: false,
        priority: data.text("priority"),
        status: data.text("status"),
        task_type: data.text("task_type"),
        assignees: data.all("assignees"),
    }
    .with_completed_checkbox(data.get("is_completed"))
}

fn task_detail_path(id: TaskId) -> String {
    format!("/tasks/{id}/")
}

async fn render_board(
    state: &AppState,
    query: &FormData,
    task_type_id: Option<TaskTypeId>,
) -> Result<Response, WebError> {
    let name = query.text("name");
    let filter = TaskFilter::all()
        .with_name(Some(name.as_str()))
        .with_task_type(task_type_id);
    let board = state.tasks().board(&filter).await?;
    Ok(Json(BoardView {
        search: Search { name },
        task_type_id,
        board,
    })
    .into_response())
}

/// `GET /tasks/`
pub(crate) async fn board(
    _actor: Actor,
    State(state): State<AppState>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let task_type_id = match query.get("task_type_id").map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id::<TaskTypeId>(raw)?),
        _ => None,
    };
    render_board(&state, &query, task_type_id).await
}

/// `GET /task_types/{id}/tasks/`
///
/// An unknown type renders an empty board rather than a 404.
pub(crate) async fn board_for_type(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let id: TaskTypeId = parse_id(&raw_id)?;
    render_board(&state, &query, Some(id)).await
}

/// `GET /tasks/status/{status}/`
pub(crate) async fn by_status(
    _actor: Actor,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let page = PageRequest::parse(query.get("page"))?;
    let listing = state.tasks().status_listing(&key, page).await?;
    Ok(Json(listing).into_response())
}

/// `GET /tasks/{id}/`
pub(crate) async fn detail(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let detail = state.tasks().detail(parse_id(&raw_id)?).await?;
    Ok(Json(detail).into_response())
}

/// `GET /tasks/create/`
pub(crate) async fn create_form(
    _actor: Actor,
    State(state): State<AppState>,
) -> Result<Response, WebError> {
    let choices = state.tasks().form_choices().await?;
    Ok(form_view(
        &TaskForm::default(),
        &FormErrors::new(),
        Choices { choices },
    ))
}

/// `POST /tasks/create/`
pub(crate) async fn create(
    _actor: Actor,
    State(state): State<AppState>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let form = task_form(&data);
    match state.tasks().create(&form).await {
        Ok(_) => Ok(see_other("/tasks/")),
        Err(TaskServiceError::Invalid(errors)) => {
            let choices = state.tasks().form_choices().await?;
            Ok(form_view(&form, &errors, Choices { choices }))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /tasks/{id}/update/`
pub(crate) async fn update_form(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let task = state.tasks().find(parse_id(&raw_id)?).await?;
    let choices = state.tasks().form_choices().await?;
    Ok(form_view(
        &TaskForm::from_task(&task),
        &FormErrors::new(),
        Choices { choices },
    ))
}

/// `POST /tasks/{id}/update/`
pub(crate) async fn update(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let id: TaskId = parse_id(&raw_id)?;
    let form = task_form(&data);
    match state.tasks().update(id, &form).await {
        Ok(_) => Ok(see_other("/tasks/")),
        Err(TaskServiceError::Invalid(errors)) => {
            let choices = state.tasks().form_choices().await?;
            Ok(form_view(&form, &errors, Choices { choices }))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /tasks/{id}/delete/`
pub(crate) async fn confirm_delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let object = state.tasks().find(parse_id(&raw_id)?).await?;
    Ok(Json(ConfirmDelete { object }).into_response())
}

/// `POST /tasks/{id}/delete/`
pub(crate) async fn delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    state.tasks().delete(parse_id(&raw_id)?).await?;
    Ok(see_other("/tasks/"))
}

/// `POST /tasks/{id}/toggle-assign/`
pub(crate) async fn toggle_assign(
    actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let id: TaskId = parse_id(&raw_id)?;
    state
        .tasks()
        .toggle_assignment(id, actor.worker().id())
        .await?;
    Ok(see_other(&task_detail_path(id)))
}

/// `POST /tasks/{id}/set-status/`
pub(crate) async fn set_status(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let id: TaskId = parse_id(&raw_id)?;
    state.tasks().set_status(id, data.get("status")).await?;
    Ok(see_other(&task_detail_path(id)))
}

/// `GET /tasks/{id}/manage-users/`
pub(crate) async fn assignees_form(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let selection = state.tasks().assignee_selection(parse_id(&raw_id)?).await?;
    Ok(Json(SelectionView {
        selection,
        errors: FormErrors::new(),
    })
    .into_response())
}

/// `POST /tasks/{id}/manage-users/`
pub(crate) async fn set_assignees(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let id: TaskId = parse_id(&raw_id)?;
    match state.tasks().set_assignees(id, &data.all("users")).await {
        Ok(_) => Ok(see_other(&task_detail_path(id))),
        Err(TaskServiceError::Invalid(errors)) => {
            let selection = state.tasks().assignee_selection(id).await?;
            Ok(Json(SelectionView { selection, errors }).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
