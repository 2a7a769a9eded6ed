//! Login and logout.

use super::{form_view, see_other};
use crate::tracker::services::{AuthError, FormErrors, NON_FIELD_ERRORS};
use crate::web::{
    AppState, WebError,
    forms::{FormData, local_target},
    session::{expired_session_cookie, session_cookie, session_id_from},
};
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Login form as echoed back. The password never is.
#[derive(Debug, Default, Serialize)]
struct LoginForm {
    username: String,
}

#[derive(Debug, Serialize)]
struct Next {
    next: String,
}

/// `GET /login`
pub(crate) async fn login_form(Query(query): Query<FormData>) -> Response {
    form_view(
        &LoginForm::default(),
        &FormErrors::new(),
        Next {
            next: query.text("next"),
        },
    )
}

/// `POST /login`
///
/// A successful login replaces the session named by the request's cookie.
pub(crate) async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(data): Form<FormData>,
) -> Result<Response, WebError> {
    let form = LoginForm {
        username: data.text("username"),
    };
    let next = data.text("next");
    let previous = session_id_from(&headers);
    match state
        .auth()
        .login(&form.username, &data.text("password"), previous)
        .await
    {
        Ok(session) => {
            let target = local_target(Some(next.as_str())).unwrap_or("/");
            let cookie = session_cookie(session.id(), state.auth().ttl());
            Ok(([(header::SET_COOKIE, cookie)], see_other(target)).into_response())
        }
        Err(err @ AuthError::InvalidCredentials) => Ok(form_view(
            &form,
            &FormErrors::single(NON_FIELD_ERRORS, err.to_string()),
            Next { next },
        )),
        Err(err) => Err(err.into()),
    }
}

/// `POST /logout`
pub(crate) async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(id) = session_id_from(&headers) {
        state.auth().logout(id).await?;
    }
    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        see_other("/login"),
    )
        .into_response())
}
