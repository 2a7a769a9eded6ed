//! Home page.

use crate::web::{AppState, WebError, session::Actor};
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// `GET /`
pub(crate) async fn home(
    actor: Actor,
    State(state): State<AppState>,
) -> Result<Response, WebError> {
    let dashboard = state.dashboard().visit(actor.session_id()).await?;
    Ok(Json(dashboard).into_response())
}

/// `GET /health`
pub(crate) async fn health() -> Response {
    Json(json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") })).into_response()
}
