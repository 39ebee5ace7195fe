use axum::Extension;
use axum::response::IntoResponse;

use crate::api::rest::dto::{PatchPreferencesRequest, UnitPreferencesDto};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, data};
use crate::api::rest::middleware::Authz;
use crate::domain::service::AppServices;

pub async fn get_preferences(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let prefs = svc.preferences.get_preferences(&ctx).await?;
    Ok(data(UnitPreferencesDto::from(prefs)))
}

pub async fn patch_preferences(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<PatchPreferencesRequest>,
) -> ApiResult<impl IntoResponse> {
    let patch = req.into_patch()?;
    let prefs = svc.preferences.patch_preferences(&ctx, patch).await?;
    Ok(data(UnitPreferencesDto::from(prefs)))
}
