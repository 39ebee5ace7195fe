use std::sync::Arc;

use async_trait::async_trait;
use divelog_sdk::{
    DiveLogError, SecurityContext, UnitPreferences, UnitPreferencesClientV1, UnitPreferencesPatch,
};

use crate::domain::service::PreferencesService;

/// In-process `UnitPreferencesClientV1` backed by the preferences service.
pub struct LocalClient {
    service: Arc<PreferencesService>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<PreferencesService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UnitPreferencesClientV1 for LocalClient {
    async fn get_preferences(
        &self,
        ctx: &SecurityContext,
    ) -> Result<UnitPreferences, DiveLogError> {
        self.service.get_preferences(ctx).await.map_err(Into::into)
    }

    async fn patch_preferences(
        &self,
        ctx: &SecurityContext,
        patch: UnitPreferencesPatch,
    ) -> Result<UnitPreferences, DiveLogError> {
        self.service
            .patch_preferences(ctx, patch)
            .await
            .map_err(Into::into)
    }
}
