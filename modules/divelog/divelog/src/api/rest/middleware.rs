//! Session gate for protected routes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use divelog_sdk::SecurityContext;
use tracing::debug;

use super::error::{ApiError, SessionEnded};
use crate::auth::{SessionCookie, SessionValidator, extract_session_token};

/// How session cookies are written on sign-in and removed on sign-out.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub cookie: SessionCookie,
    pub max_age: Duration,
}

impl CookiePolicy {
    /// # Errors
    /// Fails if the token is not a valid header value.
    pub fn issue(self, token: &str) -> Result<HeaderValue, ApiError> {
        self.cookie.issue(token, self.max_age).map_err(|e| {
            tracing::error!(error = %e, "Session token is not a valid cookie value");
            ApiError::internal()
        })
    }

    #[must_use]
    pub fn clear(self) -> HeaderValue {
        self.cookie.clear()
    }
}

#[derive(Clone)]
pub struct SessionLayerState {
    pub validator: Arc<SessionValidator>,
    pub cookie: SessionCookie,
}

/// Validate the session token and expose the caller as a `SecurityContext`.
///
/// Rejected sessions get a 401; dead tokens also get their cookie removed,
/// including when a handler finds the session stale in storage.
pub async fn require_session(
    State(state): State<SessionLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(request.headers(), state.cookie.name());
    let outcome = state.validator.validate(token).await;
    match outcome {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            let mut response = next.run(request).await;
            if response.extensions().get::<SessionEnded>().is_some() {
                response
                    .headers_mut()
                    .insert(SET_COOKIE, state.cookie.clear());
            }
            response
        }
        Err(rejection) => {
            debug!(reason = %rejection, path = %request.uri().path(), "Session rejected");
            ApiError::session(rejection, state.cookie).into_response()
        }
    }
}

/// Extractor for the authenticated caller; requires `require_session` upstream.
#[derive(Debug, Clone, Copy)]
pub struct Authz(pub SecurityContext);

impl<S> FromRequestParts<S> for Authz
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .copied()
            .map(Authz)
            .ok_or_else(|| {
                tracing::error!("SecurityContext not found - session layer not configured");
                ApiError::internal()
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::header::COOKIE;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::{SESSION_COOKIE, SessionVersionLookup, TokenIssuer};
    use crate::domain::error::DomainError;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    /// Storage that cannot answer version lookups.
    struct Unreachable;

    #[async_trait]
    impl SessionVersionLookup for Unreachable {
        async fn current_session_version(&self, _user_id: Uuid) -> anyhow::Result<Option<i64>> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    fn app(issuer: Arc<TokenIssuer>) -> Router {
        let state = SessionLayerState {
            validator: Arc::new(SessionValidator::new(issuer, Arc::new(Unreachable))),
            cookie: SessionCookie::new(false),
        };
        Router::new()
            .route(
                "/stale",
                get(|| async { ApiError::from(DomainError::stale_session()) }),
            )
            .route(
                "/ok",
                get(|Authz(ctx): Authz| async move { ctx.session_version().to_string() }),
            )
            .route_layer(from_fn_with_state(state, require_session))
    }

    fn request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(COOKIE, format!("{SESSION_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn lookup_failure_lets_the_request_through() {
        let issuer = Arc::new(TokenIssuer::new(SECRET, Duration::from_secs(600)));
        let token = issuer.issue(Uuid::new_v4(), 3).unwrap();

        let response = app(issuer).oneshot(request("/ok", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn stale_session_found_by_a_handler_clears_the_cookie() {
        let issuer = Arc::new(TokenIssuer::new(SECRET, Duration::from_secs(600)));
        let token = issuer.issue(Uuid::new_v4(), 3).unwrap();

        let response = app(issuer).oneshot(request("/stale", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("divelog.session-token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
