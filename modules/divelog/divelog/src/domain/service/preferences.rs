use std::sync::Arc;

use divelog_sdk::{SecurityContext, UnitPreferences, UnitPreferencesPatch};
use tracing::{debug, instrument};

use super::owner;
use crate::domain::error::DomainError;
use crate::domain::repo::PreferencesRepository;

pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    pub fn new(repo: Arc<dyn PreferencesRepository>) -> Self {
        Self { repo }
    }

    /// Stored axes merged over the defaults. Nothing is written on read.
    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn get_preferences(
        &self,
        ctx: &SecurityContext,
    ) -> Result<UnitPreferences, DomainError> {
        let stored = self.repo.find(owner(ctx)).await?;
        if stored.is_none() {
            debug!("No stored preferences, using defaults");
        }
        Ok(stored
            .map(|partial| UnitPreferences::from_partial(&partial))
            .unwrap_or_default())
    }

    /// Write only the axes present in `patch` and return the merged set.
    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn patch_preferences(
        &self,
        ctx: &SecurityContext,
        patch: UnitPreferencesPatch,
    ) -> Result<UnitPreferences, DomainError> {
        if !patch.is_empty() {
            self.repo.upsert(owner(ctx), patch).await?;
        }
        self.get_preferences(ctx).await
    }
}
