use axum::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::display_preferences;
use crate::api::rest::dto::{DiveDto, DiveRequest};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, PathParam, data};
use crate::api::rest::middleware::Authz;
use crate::domain::service::AppServices;

pub async fn list_dives(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let dives = svc.dives.list_dives(&ctx).await?;
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    let dtos: Vec<DiveDto> = dives.into_iter().map(|d| DiveDto::new(d, &prefs)).collect();
    Ok(data(dtos))
}

pub async fn get_dive(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let dive = svc.dives.get_dive(&ctx, id).await?;
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    Ok(data(DiveDto::new(dive, &prefs)))
}

pub async fn create_dive(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<DiveRequest>,
) -> ApiResult<impl IntoResponse> {
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    let dive = svc.dives.create_dive(&ctx, req.into_draft(&prefs)?).await?;
    Ok((StatusCode::CREATED, data(DiveDto::new(dive, &prefs))))
}

pub async fn replace_dive(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<DiveRequest>,
) -> ApiResult<impl IntoResponse> {
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    let dive = svc
        .dives
        .replace_dive(&ctx, id, req.into_draft(&prefs)?)
        .await?;
    Ok(data(DiveDto::new(dive, &prefs)))
}

pub async fn delete_dive(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    svc.dives.delete_dive(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
