//! Session cookie naming, issuing and parsing.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, COOKIE, InvalidHeaderValue};
use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "divelog.session-token";
pub const SECURE_SESSION_COOKIE: &str = "__Secure-divelog.session-token";

const CLEAR_COOKIE: &str = "divelog.session-token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";
const CLEAR_SECURE_COOKIE: &str =
    "__Secure-divelog.session-token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax; Secure";

/// Builds `Set-Cookie` values for the session token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCookie {
    secure: bool,
}

impl SessionCookie {
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        if self.secure {
            SECURE_SESSION_COOKIE
        } else {
            SESSION_COOKIE
        }
    }

    /// `Set-Cookie` value carrying `token` for `max_age`.
    ///
    /// # Errors
    /// Returns an error if the token contains bytes not allowed in a header.
    pub fn issue(self, token: &str, max_age: Duration) -> Result<HeaderValue, InvalidHeaderValue> {
        let secure = if self.secure { "; Secure" } else { "" };
        HeaderValue::from_str(&format!(
            "{}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{secure}",
            self.name(),
            max_age.as_secs()
        ))
    }

    /// `Set-Cookie` value that removes the session cookie.
    #[must_use]
    pub fn clear(self) -> HeaderValue {
        if self.secure {
            HeaderValue::from_static(CLEAR_SECURE_COOKIE)
        } else {
            HeaderValue::from_static(CLEAR_COOKIE)
        }
    }
}

/// Find the session token: the named cookie first, then a bearer header.
#[must_use]
pub fn extract_session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    find_cookie(headers, cookie_name).or_else(|| extract_bearer_token(headers))
}

fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let h = headers(&[("cookie", "theme=dark; divelog.session-token=abc.def; x=1")]);
        assert_eq!(extract_session_token(&h, SESSION_COOKIE), Some("abc.def"));
    }

    #[test]
    fn secure_name_does_not_match_plain_cookie() {
        let h = headers(&[("cookie", "divelog.session-token=abc")]);
        assert_eq!(extract_session_token(&h, SECURE_SESSION_COOKIE), None);
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let h = headers(&[("authorization", "Bearer tok")]);
        assert_eq!(extract_session_token(&h, SESSION_COOKIE), Some("tok"));
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let h = headers(&[
            ("cookie", "divelog.session-token=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extract_session_token(&h, SESSION_COOKIE), Some("from-cookie"));
    }

    #[test]
    fn empty_cookie_value_counts_as_missing() {
        let h = headers(&[("cookie", "divelog.session-token=")]);
        assert_eq!(extract_session_token(&h, SESSION_COOKIE), None);
    }

    #[test]
    fn issued_cookie_carries_attributes() {
        let value = SessionCookie::new(true)
            .issue("tok", Duration::from_secs(60))
            .unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "__Secure-divelog.session-token=tok; Path=/; Max-Age=60; HttpOnly; SameSite=Lax; Secure"
        );
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = SessionCookie::new(false).clear();
        assert!(value.to_str().unwrap().starts_with("divelog.session-token=;"));
        assert!(value.to_str().unwrap().contains("Max-Age=0"));
    }
}
