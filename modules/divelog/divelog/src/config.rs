use std::time::Duration;

use anyhow::{bail, ensure};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Minimum HMAC key length accepted for session tokens.
pub const MIN_SECRET_BYTES: usize = 32;

/// Configuration for the divelog module.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiveLogConfig {
    /// HMAC-SHA256 key for session tokens.
    #[serde(serialize_with = "redact")]
    pub session_secret: SecretString,

    /// Lifetime of a session token and its cookie.
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,

    /// Use the `__Secure-` cookie name and the `Secure` attribute.
    pub secure_cookies: bool,

    pub max_text_length: usize,
    pub max_notes_length: usize,
    pub min_password_length: usize,
}

impl Default for DiveLogConfig {
    fn default() -> Self {
        Self {
            session_secret: SecretString::from(String::new()),
            session_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            secure_cookies: false,
            max_text_length: 200,
            max_notes_length: 10_000,
            min_password_length: 8,
        }
    }
}

impl DiveLogConfig {
    /// Check the values a running server depends on.
    ///
    /// # Errors
    /// Returns an error when the session secret is missing or too short, or
    /// when a limit is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        let secret_len = self.session_secret.expose_secret().len();
        if secret_len == 0 {
            bail!("divelog.session_secret is not set");
        }
        ensure!(
            secret_len >= MIN_SECRET_BYTES,
            "divelog.session_secret must be at least {MIN_SECRET_BYTES} bytes (got {secret_len})"
        );
        ensure!(
            !self.session_ttl.is_zero(),
            "divelog.session_ttl must be positive"
        );
        ensure!(
            self.max_text_length > 0 && self.max_notes_length > 0,
            "divelog text limits must be positive"
        );
        Ok(())
    }
}

fn redact<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    if secret.expose_secret().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("[redacted]")
    }
}
