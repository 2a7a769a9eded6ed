//! Mapping of service failures onto HTTP responses.

use crate::tracker::{
    domain::PageError,
    ports::{SessionStoreError, TrackerRepositoryError},
    services::{
        AuthError, DashboardError, FormErrors, NON_FIELD_ERRORS, PositionServiceError,
        TaskServiceError, TaskTypeServiceError, WorkerServiceError,
    },
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure of a request handler.
#[derive(Debug, Error)]
pub enum WebError {
    /// Form validation failed without an echoed form to render.
    #[error("invalid form: {0}")]
    Invalid(FormErrors),
    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The request conflicts with data still referencing the resource.
    #[error("{0}")]
    Conflict(String),
    /// Storage failed; details are logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    /// Not-found error for a path id that does not parse.
    pub(crate) fn malformed_id(raw: &str) -> Self {
        Self::NotFound(format!("no resource with id {raw:?}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(errors) => {
                (StatusCode::OK, Json(json!({ "errors": errors }))).into_response()
            }
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            Self::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<PageError> for WebError {
    fn from(err: PageError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<TrackerRepositoryError> for WebError {
    fn from(err: TrackerRepositoryError) -> Self {
        if err.is_not_found() {
            return Self::NotFound(err.to_string());
        }
        match err {
            TrackerRepositoryError::TaskTypeInUse { .. } => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<SessionStoreError> for WebError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(_) => Self::NotFound(err.to_string()),
            SessionStoreError::Persistence(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TaskServiceError> for WebError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Invalid(errors) => Self::Invalid(errors),
            TaskServiceError::NotFound(_) | TaskServiceError::Page(_) => {
                Self::NotFound(err.to_string())
            }
            TaskServiceError::Repository(inner) => inner.into(),
        }
    }
}

impl From<WorkerServiceError> for WebError {
    fn from(err: WorkerServiceError) -> Self {
        match err {
            WorkerServiceError::Invalid(errors) => Self::Invalid(errors),
            WorkerServiceError::NotFound(_) | WorkerServiceError::Page(_) => {
                Self::NotFound(err.to_string())
            }
            WorkerServiceError::Repository(inner) => inner.into(),
        }
    }
}

impl From<PositionServiceError> for WebError {
    fn from(err: PositionServiceError) -> Self {
        match err {
            PositionServiceError::Invalid(errors) => Self::Invalid(errors),
            PositionServiceError::NotFound(_) | PositionServiceError::Page(_) => {
                Self::NotFound(err.to_string())
            }
            PositionServiceError::Repository(inner) => inner.into(),
        }
    }
}

impl From<TaskTypeServiceError> for WebError {
    fn from(err: TaskTypeServiceError) -> Self {
        match err {
            TaskTypeServiceError::Invalid(errors) => Self::Invalid(errors),
            TaskTypeServiceError::NotFound(_) | TaskTypeServiceError::Page(_) => {
                Self::NotFound(err.to_string())
            }
            TaskTypeServiceError::InUse { .. } => Self::Conflict(err.to_string()),
            TaskTypeServiceError::Repository(inner) => inner.into(),
        }
    }
}

impl From<DashboardError> for WebError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Repository(inner) => inner.into(),
            DashboardError::Session(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for WebError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Invalid(FormErrors::single(NON_FIELD_ERRORS, err.to_string()))
            }
            AuthError::Repository(inner) => inner.into(),
            AuthError::Session(inner) => inner.into(),
        }
    }
}
