pub mod account;
pub mod auth;
pub mod certifications;
pub mod dives;
pub mod gear;
pub mod plans;
pub mod preferences;

use divelog_sdk::{SecurityContext, UnitPreferences};
use tracing::warn;

use crate::domain::service::PreferencesService;

/// Caller's display units. A failed read falls back to the defaults.
pub(crate) async fn display_preferences(
    svc: &PreferencesService,
    ctx: &SecurityContext,
) -> UnitPreferences {
    svc.get_preferences(ctx).await.unwrap_or_else(|e| {
        warn!(error = %e, "Could not load unit preferences, using defaults");
        UnitPreferences::default()
    })
}
