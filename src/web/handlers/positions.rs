//! Position list and CRUD.

use super::{ConfirmDelete, NoContext, form_view, see_other};
use crate::tracker::{
    domain::{Page, PageRequest, PositionId, PositionSummary},
    services::{FormErrors, NameForm, PositionServiceError},
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
struct PositionListView {
    search: Search,
    page: Page<PositionSummary>,
}

/// `GET /positions/`
///
/// The search box historically submitted `position`; `name` is accepted too.
pub(crate) async fn list(
    _actor: Actor,
    State(state): State<AppState>,
    Query(query): Query<FormData>,
) -> Result<Response, WebError> {
    let name = query
        .get("position")
        .filter(|value| !value.trim().is_empty())
        .or_else(|| query.get("name"))
        .unwrap_or_default()
        .to_owned();
    let request = PageRequest::parse(query.get("page"))?;
    let page = state.positions().list(Some(name.as_str()), request).await?;
    Ok(Json(PositionListView {
        search: Search { name },
        page,
    })
    .into_response())
}

/// `GET /positions/create/`
pub(crate) async fn create_form(_actor: Actor) -> Response {
    form_view(&NameForm::default(), &FormErrors::new(), NoContext {})
}

/// `POST /positions/create/`
pub(crate) async fn create(
    _actor: Actor,
    State(state): State<AppState>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let form = NameForm::new(data.text("name"));
    match state.positions().create(&form).await {
        Ok(_) => Ok(see_other("/positions/")),
        Err(PositionServiceError::Invalid(errors)) => Ok(form_view(&form, &errors, NoContext {})),
        Err(err) => Err(err.into()),
    }
}

/// `GET /positions/{id}/update/`
pub(crate) async fn update_form(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let position = state.positions().find(parse_id(&raw_id)?).await?;
    Ok(form_view(
        &NameForm::new(position.name().as_str()),
        &FormErrors::new(),
        NoContext {},
    ))
}

/// `POST /positions/{id}/update/`
pub(crate) async fn update(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let id: PositionId = parse_id(&raw_id)?;
    let form = NameForm::new(data.text("name"));
    match state.positions().update(id, &form).await {
        Ok(_) => Ok(see_other("/positions/")),
        Err(PositionServiceError::Invalid(errors)) => Ok(form_view(&form, &errors, NoContext {})),
        Err(err) => Err(err.into()),
    }
}

/// `GET /positions/{id}/delete/`
pub(crate) async fn confirm_delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let object = state.positions().find(parse_id(&raw_id)?).await?;
    Ok(Json(ConfirmDelete { object }).into_response())
}

/// `POST /positions/{id}/delete/`
pub(crate) async fn delete(
    _actor: Actor,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    state.positions().delete(parse_id(&raw_id)?).await?;
    Ok(see_other("/positions/"))
}
