//! Signed session tokens (HS256 JWT).

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::DiveLogConfig;

/// Claims carried by a session token.
///
/// `session_version` is absent on tokens minted before versioning existed;
/// such tokens are treated as legacy and rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_version: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invalidated: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("session token expired")]
    Expired,

    #[error("session token is invalid")]
    Invalid,

    #[error("failed to sign session token: {0}")]
    Signing(String),
}

/// Issues and verifies session tokens with one shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    #[must_use]
    pub fn from_config(config: &DiveLogConfig) -> Self {
        Self::new(
            config.session_secret.expose_secret().as_bytes(),
            config.session_ttl,
        )
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` bound to the given session version.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue(&self, user_id: Uuid, session_version: i64) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        self.sign(&SessionClaims {
            sub: user_id,
            session_version: Some(session_version),
            invalidated: false,
            iat: now,
            exp: now.saturating_add(ttl),
        })
    }

    /// Sign arbitrary claims with this issuer's key.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    /// Returns `TokenError::Expired` past `exp` and `TokenError::Invalid` for
    /// anything else that fails verification.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_decodes_to_subject_and_version() {
        let user = Uuid::new_v4();
        let token = issuer().issue(user, 4).unwrap();
        let claims = issuer().decode(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.session_version, Some(4));
        assert!(!claims.invalidated);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_another_key_is_invalid() {
        let other = TokenIssuer::new(b"another-secret-another-secret-xx", Duration::from_secs(60));
        let token = other.issue(Uuid::new_v4(), 0).unwrap();
        assert_eq!(issuer().decode(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = issuer()
            .sign(&SessionClaims {
                sub: Uuid::new_v4(),
                session_version: Some(0),
                invalidated: false,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert_eq!(issuer().decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(issuer().decode("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn claims_without_version_decode_as_legacy() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = issuer()
            .sign(&SessionClaims {
                sub: Uuid::new_v4(),
                session_version: None,
                invalidated: false,
                iat: now,
                exp: now + 60,
            })
            .unwrap();
        let claims = issuer().decode(&token).unwrap();
        assert_eq!(claims.session_version, None);
    }

    #[test]
    fn claims_use_camel_case_names() {
        let claims = SessionClaims {
            sub: Uuid::nil(),
            session_version: Some(1),
            invalidated: true,
            iat: 1,
            exp: 2,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["sessionVersion"], 1);
        assert_eq!(value["invalidated"], true);
    }
}
