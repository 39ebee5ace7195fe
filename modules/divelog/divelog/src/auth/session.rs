//! Two-stage session validation.
//!
//! The edge stage only looks at the token: signature, expiry and claim shape.
//! The persisted stage compares the token's `sessionVersion` with the counter
//! stored for the user. A password change bumps the counter, which rejects
//! every token minted before it.

use std::sync::Arc;

use async_trait::async_trait;
use divelog_sdk::SecurityContext;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::token::{TokenError, TokenIssuer};

/// Why a request was not let through.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session expired")]
    Expired,

    #[error("Session has been invalidated")]
    Invalidated,

    #[error("Session token is outdated, please sign in again")]
    LegacyToken,

    #[error("Account no longer exists")]
    UnknownUser,

    #[error("Session is no longer valid, please sign in again")]
    VersionMismatch,
}

impl Rejection {
    /// Whether the response should also remove the session cookie.
    #[must_use]
    pub fn clears_cookie(self) -> bool {
        !matches!(self, Rejection::MissingToken)
    }
}

/// Claims that passed the edge stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSession {
    pub user_id: Uuid,
    pub session_version: i64,
}

/// Token-only checks. Needs no storage.
///
/// # Errors
/// Returns the `Rejection` for the first failed check.
pub fn check_edge(issuer: &TokenIssuer, token: Option<&str>) -> Result<EdgeSession, Rejection> {
    let token = token.ok_or(Rejection::MissingToken)?;
    let claims = issuer.decode(token).map_err(|e| match e {
        TokenError::Expired => Rejection::Expired,
        TokenError::Invalid | TokenError::Signing(_) => Rejection::InvalidToken,
    })?;

    if claims.invalidated {
        return Err(Rejection::Invalidated);
    }
    let session_version = claims.session_version.ok_or(Rejection::LegacyToken)?;

    Ok(EdgeSession {
        user_id: claims.sub,
        session_version,
    })
}

/// Reads the persisted session counter for a user.
#[async_trait]
pub trait SessionVersionLookup: Send + Sync {
    /// `Ok(None)` when the user does not exist.
    async fn current_session_version(&self, user_id: Uuid) -> anyhow::Result<Option<i64>>;
}

/// Compare an edge-checked session with storage.
///
/// A failing lookup lets the request through with the token's claims; the
/// account-mutating services re-check the counter themselves.
///
/// # Errors
/// Returns `Rejection::UnknownUser` or `Rejection::VersionMismatch`.
pub async fn check_persisted(
    lookup: &dyn SessionVersionLookup,
    edge: EdgeSession,
) -> Result<SecurityContext, Rejection> {
    match lookup.current_session_version(edge.user_id).await {
        Ok(Some(current)) if current == edge.session_version => {
            Ok(SecurityContext::new(edge.user_id, edge.session_version))
        }
        Ok(Some(current)) => {
            debug!(
                user_id = %edge.user_id,
                token_version = edge.session_version,
                current,
                "Session version mismatch"
            );
            Err(Rejection::VersionMismatch)
        }
        Ok(None) => Err(Rejection::UnknownUser),
        Err(e) => {
            warn!(user_id = %edge.user_id, error = %e, "Session version lookup failed, accepting token claims");
            Ok(SecurityContext::new(edge.user_id, edge.session_version))
        }
    }
}

/// Both stages behind one call.
#[derive(Clone)]
pub struct SessionValidator {
    issuer: Arc<TokenIssuer>,
    lookup: Arc<dyn SessionVersionLookup>,
}

impl SessionValidator {
    #[must_use]
    pub fn new(issuer: Arc<TokenIssuer>, lookup: Arc<dyn SessionVersionLookup>) -> Self {
        Self { issuer, lookup }
    }

    /// Validate a raw token taken from the request.
    ///
    /// # Errors
    /// Returns the `Rejection` of whichever stage failed.
    pub async fn validate(&self, token: Option<&str>) -> Result<SecurityContext, Rejection> {
        let edge = check_edge(&self.issuer, token)?;
        check_persisted(self.lookup.as_ref(), edge).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use time::OffsetDateTime;

    use super::*;
    use crate::auth::token::SessionClaims;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    enum Lookup {
        Version(i64),
        Missing,
        Broken,
    }

    #[async_trait]
    impl SessionVersionLookup for Lookup {
        async fn current_session_version(&self, _user_id: Uuid) -> anyhow::Result<Option<i64>> {
            match self {
                Lookup::Version(v) => Ok(Some(*v)),
                Lookup::Missing => Ok(None),
                Lookup::Broken => Err(anyhow::anyhow!("connection reset")),
            }
        }
    }

    fn issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(SECRET, Duration::from_secs(600)))
    }

    fn validator(lookup: Lookup) -> SessionValidator {
        SessionValidator::new(issuer(), Arc::new(lookup))
    }

    fn signed(session_version: Option<i64>, invalidated: bool) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        issuer()
            .sign(&SessionClaims {
                sub: Uuid::new_v4(),
                session_version,
                invalidated,
                iat: now,
                exp: now + 600,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn matching_version_is_accepted() {
        let user = Uuid::new_v4();
        let token = issuer().issue(user, 2).unwrap();
        let ctx = validator(Lookup::Version(2))
            .validate(Some(&token))
            .await
            .unwrap();
        assert_eq!(ctx.subject_id(), user);
        assert_eq!(ctx.session_version(), 2);
    }

    #[tokio::test]
    async fn older_version_is_rejected_and_clears_cookie() {
        let token = issuer().issue(Uuid::new_v4(), 1).unwrap();
        let err = validator(Lookup::Version(2))
            .validate(Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err, Rejection::VersionMismatch);
        assert!(err.clears_cookie());
    }

    #[tokio::test]
    async fn missing_token_does_not_clear_cookie() {
        let err = validator(Lookup::Version(0)).validate(None).await.unwrap_err();
        assert_eq!(err, Rejection::MissingToken);
        assert!(!err.clears_cookie());
    }

    #[tokio::test]
    async fn legacy_and_invalidated_tokens_fail_at_the_edge() {
        let v = validator(Lookup::Version(0));
        assert_eq!(
            v.validate(Some(&signed(None, false))).await,
            Err(Rejection::LegacyToken)
        );
        assert_eq!(
            v.validate(Some(&signed(Some(0), true))).await,
            Err(Rejection::Invalidated)
        );
        assert_eq!(
            v.validate(Some("garbage")).await,
            Err(Rejection::InvalidToken)
        );
    }

    #[tokio::test]
    async fn deleted_user_is_rejected() {
        let token = issuer().issue(Uuid::new_v4(), 0).unwrap();
        assert_eq!(
            validator(Lookup::Missing).validate(Some(&token)).await,
            Err(Rejection::UnknownUser)
        );
    }

    #[tokio::test]
    async fn lookup_failure_fails_open_with_token_claims() {
        let user = Uuid::new_v4();
        let token = issuer().issue(user, 7).unwrap();
        let ctx = validator(Lookup::Broken)
            .validate(Some(&token))
            .await
            .unwrap();
        assert_eq!(ctx.subject_id(), user);
        assert_eq!(ctx.session_version(), 7);
    }
}
