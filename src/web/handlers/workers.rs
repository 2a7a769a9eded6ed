//! Worker list, detail, and account forms.

use super::{ConfirmDelete, form_view, see_other};
use crate::tracker::{
    domain::{Page, PageRequest, PositionId, WorkerId, WorkerWithPosition},
    ports::WorkerFilter,
    services::{Choice, FormErrors, WorkerCreateForm, WorkerForm, WorkerServiceError},
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
    username: String,
}

#[derive(Debug, Serialize)]
struct WorkerListView {
    search: Search,
    position_id: Option<PositionId>,
    page: Page<WorkerWithPosition>,
}

#[derive(Debug, Serialize)]
struct Positions {
    positions: Vec<Choice>,
}

fn worker_form(data: &FormData) -> WorkerForm {
    WorkerForm {
        username: data.text("username"),
        first_name: data.text("first_name"),
        last_name: data.text("last_name"),
        position: data.text("position"),
    }
}

async fn render_list(
    state: &AppState,
    query: &FormData,
    position_id: Option<PositionId>,
) -> Result<Response, WebError> {
    let username = query.text("username");
    let filter = WorkerFilter::from_query(Some(username.as_str()), position_id);
    let request = PageRequest::parse(query.get("page"))?;
    let page = state.workers().list(&filter, request).await?;
    Ok(Json(WorkerListView {
        search: Search { username },
        position_id,
        page,
    })
    .into_response())
}

/// `GET /workers/`
///
/// A username search wins, so `position_id` is only read without one.
pub(crate) async fn list(
    _actor: Actor,
    State(state): State<AppState>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let searching = !query.text("username").trim().is_empty();
    let position_id = match query.get("position_id").map(str::trim) {
        Some(raw) if !searching && !raw.is_empty() => Some(parse_id::<PositionId>(raw)?),
        _ => None,
    };
    render_list(&state, &query, position_id).await
}

/// `GET /positions/{id}/workers/`
pub(crate) async fn list_for_position(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let id: PositionId = parse_id(&raw_id)?;
    state.positions().find(id).await?;
    render_list(&state, &query, Some(id)).await
}

/// `GET /workers/{id}/`
pub(crate) async fn detail(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let detail = state.workers().detail(parse_id(&raw_id)?).await?;
    Ok(Json(detail).into_response())
}

/// `GET /workers/create/`
pub(crate) async fn create_form(
    _actor: Actor,
    State(state): State<AppState>,
) -> Result<Response, WebError> {
    let positions = state.workers().position_choices().await?;
    Ok(form_view(
        &WorkerCreateForm::default(),
        &FormErrors::new(),
        Positions { positions },
    ))
}

/// `POST /workers/create/`
pub(crate) async fn create(
    _actor: Actor,
    State(state): State<AppState>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let form = WorkerCreateForm {
        profile: worker_form(&data),
        password1: data.text("password1"),
        password2: data.text("password2"),
    };
    match state.workers().create(&form).await {
        Ok(_) => Ok(see_other("/workers/")),
        Err(WorkerServiceError::Invalid(errors)) => {
            let positions = state.workers().position_choices().await?;
            Ok(form_view(&form, &errors, Positions { positions }))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /workers/{id}/update/`
pub(crate) async fn update_form(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let worker = state.workers().find(parse_id(&raw_id)?).await?;
    let positions = state.workers().position_choices().await?;
    Ok(form_view(
        &WorkerForm::from_worker(&worker),
        &FormErrors::new(),
        Positions { positions },
    ))
}

/// `POST /workers/{id}/update/`
pub(crate) async fn update(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let id: WorkerId = parse_id(&raw_id)?;
    let form = worker_form(&data);
    match state.workers().update(id, &form).await {
        Ok(_) => Ok(see_other("/workers/")),
        Err(WorkerServiceError::Invalid(errors)) => {
            let positions = state.workers().position_choices().await?;
            Ok(form_view(&form, &errors, Positions { positions }))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /workers/{id}/delete/`
pub(crate) async fn confirm_delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let object = state.workers().find(parse_id(&raw_id)?).await?;
    Ok(Json(ConfirmDelete { object }).into_response())
}

/// `POST /workers/{id}/delete/`
pub(crate) async fn delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    state.workers().delete(parse_id(&raw_id)?).await?;
    Ok(see_other("/workers/"))
}
