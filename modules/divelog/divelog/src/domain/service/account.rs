use std::sync::Arc;

use divelog_sdk::{SecurityContext, UserProfile};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::ServiceConfig;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenIssuer;
use crate::domain::error::DomainError;
use crate::domain::fields::{AccountFields, Violations};
use crate::domain::repo::{UserCredentials, UserRepository};

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PASSWORD_LENGTH: usize = 1024;
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// A profile together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub profile: UserProfile,
    pub token: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    issuer: Arc<TokenIssuer>,
    config: ServiceConfig,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        issuer: Arc<TokenIssuer>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            issuer,
            config,
        }
    }

    #[instrument(skip_all)]
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<SessionGrant, DomainError> {
        let email = normalize_email(email);
        let mut v = Violations::new();
        validate_email(&mut v, &email);
        v.require_text(
            AccountFields::DISPLAY_NAME,
            display_name,
            self.config.max_text_length,
        );
        self.validate_password(&mut v, AccountFields::PASSWORD, password);
        v.finish()?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("An account with this email already exists"));
        }

        let hash = hash_blocking(password).await?;
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.trim().to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };
        let created = self.users.create(&profile, &hash).await?;

        info!(user_id = %created.profile.id, "Registered account");
        self.grant(created.profile, created.session_version)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionGrant, DomainError> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("Login for unknown email");
            return Err(DomainError::unauthenticated(BAD_CREDENTIALS));
        };

        if !verify_blocking(password, &user.password_hash).await? {
            debug!(user_id = %user.profile.id, "Login with wrong password");
            return Err(DomainError::unauthenticated(BAD_CREDENTIALS));
        }

        info!(user_id = %user.profile.id, "Signed in");
        self.grant(user.profile, user.session_version)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn me(&self, ctx: &SecurityContext) -> Result<UserProfile, DomainError> {
        let user = self
            .users
            .find_by_id(ctx.subject_id())
            .await?
            .ok_or_else(DomainError::account_gone)?;
        Ok(user.profile)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn update_profile(
        &self,
        ctx: &SecurityContext,
        display_name: &str,
    ) -> Result<UserProfile, DomainError> {
        let mut v = Violations::new();
        v.require_text(
            AccountFields::DISPLAY_NAME,
            display_name,
            self.config.max_text_length,
        );
        v.finish()?;

        self.users
            .update_display_name(ctx.subject_id(), display_name.trim())
            .await?
            .ok_or_else(DomainError::account_gone)
    }

    /// Verify the current password, store the new one and bump the session
    /// version. The returned token carries the new version; every older
    /// token stops validating.
    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn change_password(
        &self,
        ctx: &SecurityContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<SessionGrant, DomainError> {
        let user = self.require_current_session(ctx).await?;

        let mut v = Violations::new();
        self.validate_password(&mut v, AccountFields::NEW_PASSWORD, new_password);
        v.finish()?;

        if !verify_blocking(current_password, &user.password_hash).await? {
            return Err(DomainError::validation(
                AccountFields::CURRENT_PASSWORD,
                "is incorrect",
            ));
        }

        let hash = hash_blocking(new_password).await?;
        let version = self
            .users
            .change_password(user.profile.id, user.session_version, &hash)
            .await?
            .ok_or_else(DomainError::stale_session)?;

        info!(session_version = version, "Password changed, other sessions invalidated");
        self.grant(user.profile, version)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn delete_account(
        &self,
        ctx: &SecurityContext,
        password: &str,
    ) -> Result<(), DomainError> {
        let user = self.require_current_session(ctx).await?;

        if !verify_blocking(password, &user.password_hash).await? {
            return Err(DomainError::validation(AccountFields::PASSWORD, "is incorrect"));
        }

        if !self
            .users
            .delete_with_owned_data(user.profile.id, user.session_version)
            .await?
        {
            return Err(DomainError::stale_session());
        }
        info!("Account deleted");
        Ok(())
    }

    /// Storage-authoritative version check for account mutations.
    async fn require_current_session(
        &self,
        ctx: &SecurityContext,
    ) -> Result<UserCredentials, DomainError> {
        let user = self
            .users
            .find_by_id(ctx.subject_id())
            .await?
            .ok_or_else(DomainError::account_gone)?;
        if user.session_version != ctx.session_version() {
            return Err(DomainError::stale_session());
        }
        Ok(user)
    }

    fn validate_password(&self, v: &mut Violations, field: &str, password: &str) {
        let len = password.chars().count();
        if len < self.config.min_password_length {
            v.push(
                field,
                format!(
                    "must be at least {} characters",
                    self.config.min_password_length
                ),
            );
        } else if len > MAX_PASSWORD_LENGTH {
            v.push(
                field,
                format!("must be at most {MAX_PASSWORD_LENGTH} characters"),
            );
        }
    }

    fn grant(&self, profile: UserProfile, session_version: i64) -> Result<SessionGrant, DomainError> {
        let token = self
            .issuer
            .issue(profile.id, session_version)
            .map_err(|e| DomainError::Database(e.into()))?;
        Ok(SessionGrant { profile, token })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(v: &mut Violations, email: &str) {
    let valid = email.len() <= MAX_EMAIL_LENGTH
        && !email.chars().any(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if !valid {
        v.push(AccountFields::EMAIL, "must be a valid email address");
    }
}

async fn hash_blocking(password: &str) -> Result<String, DomainError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DomainError::Database(e.into()))?
        .map_err(DomainError::Database)?;
    Ok(hash)
}

async fn verify_blocking(password: &str, hash: &str) -> Result<bool, DomainError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| DomainError::Database(e.into()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn email_ok(email: &str) -> bool {
        let mut v = Violations::new();
        validate_email(&mut v, email);
        v.is_empty()
    }

    #[test]
    fn email_shape_checks() {
        assert!(email_ok("diver@example.com"));
        assert!(!email_ok("diver@example"));
        assert!(!email_ok("@example.com"));
        assert!(!email_ok("a@b@example.com"));
        assert!(!email_ok("di ver@example.com"));
        assert!(!email_ok("diver@.com"));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Diver@Example.COM "), "diver@example.com");
    }
}
