//! Session cookie handling and the authenticated-actor extractor.

use super::{AppState, WebError};
use crate::tracker::{
    domain::{SessionId, Worker},
    services::Authenticated,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, Uri, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;
use std::str::FromStr;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "taskboard_session";

/// Session id from the request's cookies, if present and well formed.
pub(crate) fn session_id_from(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::from_str(value).ok())
}

/// `Set-Cookie` value establishing a session.
pub(crate) fn session_cookie(id: SessionId, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds()
    )
}

/// `Set-Cookie` value clearing the session.
pub(crate) fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Redirect to the login form, remembering where the caller was going.
pub(crate) fn login_redirect(uri: &Uri) -> Response {
    let next = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |target| target.as_str());
    Redirect::to(&format!("/login?next={}", urlencoding::encode(next))).into_response()
}

/// The logged-in worker behind the request.
///
/// Requests without a live session are redirected to `/login?next=...`.
#[derive(Debug, Clone)]
pub struct Actor(pub Authenticated);

impl Actor {
    /// The current session's id.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.0.session.id()
    }

    /// The logged-in worker.
    #[must_use]
    pub const fn worker(&self) -> &Worker {
        &self.0.worker
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = session_id_from(&parts.headers) else {
            return Err(login_redirect(&parts.uri));
        };
        match state.auth().resolve(id).await {
            Ok(Some(authenticated)) => Ok(Self(authenticated)),
            Ok(None) => Err(login_redirect(&parts.uri)),
            Err(err) => Err(WebError::from(err).into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SESSION_COOKIE, login_redirect, session_cookie, session_id_from};
    use crate::tracker::domain::SessionId;
    use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    fn session_id_is_read_among_other_cookies() {
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        let cookie = format!("theme=dark; {SESSION_COOKIE}={id}; lang=en");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&cookie).expect("valid header"),
        );
        assert_eq!(session_id_from(&headers), Some(id));
    }

    #[rstest]
    #[case("taskboard_session=garbage")]
    #[case("other=value")]
    fn unusable_cookies_yield_no_session(#[case] cookie: &'static str) {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        assert_eq!(session_id_from(&headers), None);
    }

    #[rstest]
    fn cookie_carries_lifetime_and_flags() {
        let id = SessionId::new();
        let cookie = session_cookie(id, Duration::days(14));
        assert_eq!(
            cookie,
            format!("taskboard_session={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age=1209600")
        );
    }

    #[rstest]
    fn login_redirect_encodes_the_original_target() {
        let response = login_redirect(&Uri::from_static("/tasks/?name=fix"));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/login?next=%2Ftasks%2F%3Fname%3Dfix");
    }
}
