//! Domain service layer - business logic and rules.
//!
//! One service per resource:
//! - `account` - registration, login, profile, password change, deletion
//! - `preferences` - unit preferences merged over defaults
//! - `dives` / `plans` - dive logs and dive plans
//! - `certifications` - definitions catalog and held certifications
//! - `gear` - gear items and kits
//!
//! Services take `SecurityContext` and scope every query to its subject.
//! They never import `api::*`.

use std::sync::Arc;

use divelog_sdk::SecurityContext;
use time::{OffsetDateTime, UtcOffset};

use crate::auth::TokenIssuer;
use crate::config::DiveLogConfig;
use crate::domain::error::DomainError;
use crate::domain::repo::{
    CertificationRepository, DiveRepository, GearRepository, PlanRepository,
    PreferencesRepository, UserRepository,
};

mod account;
mod certifications;
mod dives;
mod gear;
mod plans;
mod preferences;

pub use account::{AccountService, SessionGrant};
pub use certifications::CertificationsService;
pub use dives::DivesService;
pub use gear::GearService;
pub use plans::PlansService;
pub use preferences::PreferencesService;

/// Configuration for the domain services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_text_length: usize,
    pub max_notes_length: usize,
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_text_length: 200,
            max_notes_length: 10_000,
            min_password_length: 8,
        }
    }
}

impl From<&DiveLogConfig> for ServiceConfig {
    fn from(cfg: &DiveLogConfig) -> Self {
        Self {
            max_text_length: cfg.max_text_length,
            max_notes_length: cfg.max_notes_length,
            min_password_length: cfg.min_password_length,
        }
    }
}

/// Repositories the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub preferences: Arc<dyn PreferencesRepository>,
    pub dives: Arc<dyn DiveRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub certifications: Arc<dyn CertificationRepository>,
    pub gear: Arc<dyn GearRepository>,
}

// DI Container - aggregates all domain services
#[derive(Clone)]
pub struct AppServices {
    pub account: Arc<AccountService>,
    pub preferences: Arc<PreferencesService>,
    pub dives: Arc<DivesService>,
    pub plans: Arc<PlansService>,
    pub certifications: Arc<CertificationsService>,
    pub gear: Arc<GearService>,
}

impl AppServices {
    #[must_use]
    pub fn new(repos: Repositories, issuer: Arc<TokenIssuer>, config: &ServiceConfig) -> Self {
        Self {
            account: Arc::new(AccountService::new(repos.users, issuer, config.clone())),
            preferences: Arc::new(PreferencesService::new(repos.preferences)),
            dives: Arc::new(DivesService::new(repos.dives, config.clone())),
            plans: Arc::new(PlansService::new(repos.plans, config.clone())),
            certifications: Arc::new(CertificationsService::new(
                repos.certifications,
                config.clone(),
            )),
            gear: Arc::new(GearService::new(repos.gear, config.clone())),
        }
    }
}

pub(crate) fn owner(ctx: &SecurityContext) -> uuid::Uuid {
    ctx.subject_id()
}

pub(crate) fn to_utc(at: OffsetDateTime) -> OffsetDateTime {
    at.to_offset(UtcOffset::UTC)
}

pub(crate) fn not_found<T>(found: Option<T>, resource: &'static str) -> Result<T, DomainError> {
    found.ok_or_else(|| DomainError::not_found(resource))
}
