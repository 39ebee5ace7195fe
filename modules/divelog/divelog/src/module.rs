//! Wiring: repositories, services, session validation and the REST router.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use divelog_sdk::UnitPreferencesClientV1;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use utoipa::openapi::OpenApi;

use crate::api::rest::middleware::{CookiePolicy, SessionLayerState};
use crate::api::rest::openapi::{OpenApiInfo, OpenApiRegistry};
use crate::api::rest::routes::{self, OPENAPI_PATH};
use crate::auth::{SessionCookie, SessionValidator, TokenIssuer};
use crate::config::DiveLogConfig;
use crate::domain::service::{AppServices, Repositories, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    SeaOrmCertificationRepository, SeaOrmDiveRepository, SeaOrmGearRepository,
    SeaOrmPlanRepository, SeaOrmPreferencesRepository, SeaOrmUserRepository,
};
use crate::local_client::LocalClient;

/// The dive log module, ready to be mounted on a server.
pub struct DiveLogModule {
    db: DatabaseConnection,
    services: AppServices,
    validator: Arc<SessionValidator>,
    cookies: CookiePolicy,
}

impl DiveLogModule {
    /// # Errors
    /// Returns an error when the configuration is not usable.
    pub fn new(db: DatabaseConnection, config: &DiveLogConfig) -> anyhow::Result<Self> {
        info!("Initializing divelog module");
        config.validate()?;

        let users = Arc::new(SeaOrmUserRepository::new(db.clone()));
        let repos = Repositories {
            users: users.clone(),
            preferences: Arc::new(SeaOrmPreferencesRepository::new(db.clone())),
            dives: Arc::new(SeaOrmDiveRepository::new(db.clone())),
            plans: Arc::new(SeaOrmPlanRepository::new(db.clone())),
            certifications: Arc::new(SeaOrmCertificationRepository::new(db.clone())),
            gear: Arc::new(SeaOrmGearRepository::new(db.clone())),
        };

        let issuer = Arc::new(TokenIssuer::from_config(config));
        let services = AppServices::new(repos, issuer.clone(), &ServiceConfig::from(config));
        let validator = Arc::new(SessionValidator::new(issuer, users));
        let cookies = CookiePolicy {
            cookie: SessionCookie::new(config.secure_cookies),
            max_age: config.session_ttl,
        };

        info!(cookie = cookies.cookie.name(), "Divelog module initialized");
        Ok(Self {
            db,
            services,
            validator,
            cookies,
        })
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    /// Returns the database error of the failing migration.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running divelog database migrations");
        Migrator::up(&self.db, None).await?;
        info!("Divelog database migrations completed successfully");
        Ok(())
    }

    #[must_use]
    pub fn services(&self) -> &AppServices {
        &self.services
    }

    /// In-process preferences client for other modules.
    #[must_use]
    pub fn preferences_client(&self) -> Arc<dyn UnitPreferencesClientV1> {
        Arc::new(LocalClient::new(self.services.preferences.clone()))
    }

    fn registry(&self) -> OpenApiRegistry {
        OpenApiRegistry::new(self.cookies.cookie.name())
    }

    fn mount(&self, registry: &OpenApiRegistry) -> Router {
        let session = SessionLayerState {
            validator: self.validator.clone(),
            cookie: self.cookies.cookie,
        };
        routes::register_routes(registry, self.services.clone(), session, self.cookies)
    }

    /// OpenAPI document for every route this module serves.
    #[must_use]
    pub fn openapi(&self) -> OpenApi {
        let registry = self.registry();
        let _ = self.mount(&registry);
        registry.build_openapi(&OpenApiInfo::default())
    }

    /// All divelog routes plus `GET /divelog/v1/openapi.json`.
    #[must_use]
    pub fn router(&self) -> Router {
        info!("Registering divelog REST routes");
        let registry = self.registry();
        let router = self.mount(&registry);
        let doc = registry.build_openapi(&OpenApiInfo::default());
        info!(
            operations = registry.operation_count(),
            "Divelog REST routes registered"
        );
        router.route(OPENAPI_PATH, get(move || async move { Json(doc) }))
    }
}
