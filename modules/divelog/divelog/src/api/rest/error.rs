//! JSON error envelope and the mapping from domain errors to HTTP statuses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Rejection, SessionCookie};
use crate::domain::error::{DomainError, FieldViolation};

pub type ApiResult<T> = Result<T, ApiError>;

/// One rejected field in a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}

impl From<FieldViolation> for FieldErrorDto {
    fn from(v: FieldViolation) -> Self {
        Self {
            field: v.field,
            message: v.message,
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorDto>,
}

/// Response extension telling `require_session` to remove the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct SessionEnded;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Vec<FieldErrorDto>,
    set_cookie: Option<HeaderValue>,
    session_ended: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
            set_cookie: None,
            session_ended: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
    }

    /// 401 for a rejected session, removing the cookie when the token is dead.
    #[must_use]
    pub fn session(rejection: Rejection, cookie: SessionCookie) -> Self {
        let mut err = Self::unauthenticated(rejection.to_string());
        if rejection.clears_cookie() {
            err.set_cookie = Some(cookie.clear());
        }
        err
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { resource } => {
                Self::new(StatusCode::NOT_FOUND, format!("{resource} not found"))
            }
            DomainError::Validation(violations) => {
                let mut err = Self::bad_request("Validation failed");
                err.errors = violations.into_iter().map(Into::into).collect();
                err
            }
            DomainError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            DomainError::Unauthenticated(msg) => Self::unauthenticated(msg),
            DomainError::StaleSession(rejection) => {
                let mut err = Self::unauthenticated(rejection.to_string());
                err.session_ended = rejection.clears_cookie();
                err
            }
            DomainError::Database(e) => {
                tracing::error!(error = ?e, "Database error occurred");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected path parameters");
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            status: self.status.as_u16(),
            errors: self.errors,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(cookie) = self.set_cookie {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        if self.session_ended {
            response.extensions_mut().insert(SessionEnded);
        }
        response
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::not_found("Dive"), StatusCode::NOT_FOUND),
            (DomainError::validation("site_name", "must not be empty"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("taken"), StatusCode::CONFLICT),
            (DomainError::unauthenticated("nope"), StatusCode::UNAUTHORIZED),
            (
                DomainError::Database(anyhow::anyhow!("connection reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (domain, status) in cases {
            assert_eq!(ApiError::from(domain).status(), status);
        }
    }

    #[test]
    fn database_errors_hide_details() {
        let err = ApiError::from(DomainError::Database(anyhow::anyhow!("password=hunter2")));
        assert_eq!(err.message(), "An internal error occurred");
    }

    #[test]
    fn dead_sessions_clear_the_cookie() {
        let response =
            ApiError::session(Rejection::VersionMismatch, SessionCookie::new(false)).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));

        let response =
            ApiError::session(Rejection::MissingToken, SessionCookie::new(false)).into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn stale_session_from_a_service_marks_the_response() {
        let response = ApiError::from(DomainError::stale_session()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<SessionEnded>().is_some());

        let response = ApiError::from(DomainError::unauthenticated("nope")).into_response();
        assert!(response.extensions().get::<SessionEnded>().is_none());
    }
}
