//! HTTP error mapping. Every failure body is `{"error": "<message>"}`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use libris_core::{ErrorKind, LibraryError, ValidationError};
use log::error;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status code for a service error.
pub fn status_for(err: &LibraryError) -> StatusCode {
    match err {
        LibraryError::BookUnavailable(_) => StatusCode::CONFLICT,
        _ => match err.kind() {
            ErrorKind::Validation | ErrorKind::Referential | ErrorKind::DomainState => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Conflict | ErrorKind::DependencyBlocked => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl From<LibraryError> for ApiError {
    fn from(value: LibraryError) -> Self {
        if value.kind() == ErrorKind::Unexpected {
            error!(
                "event=http_error module=api status=error error_code={} detail={value}",
                value.code()
            );
        }
        Self::new(status_for(&value), value.public_message())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        LibraryError::from(value).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{status_for, ApiError};
    use axum::http::StatusCode;
    use libris_core::LibraryError;

    #[test]
    fn domain_state_errors_split_between_conflict_and_bad_request() {
        assert_eq!(
            status_for(&LibraryError::BookUnavailable("1".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&LibraryError::AlreadyReturned(3)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&LibraryError::IncorrectPassword),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn class_statuses() {
        assert_eq!(
            status_for(&LibraryError::Referential("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&LibraryError::DependencyBlocked("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&LibraryError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&LibraryError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unexpected_errors_are_generic() {
        let err = ApiError::from(LibraryError::Unexpected("database is locked".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "internal server error");
    }
}
