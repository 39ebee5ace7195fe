use axum::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::api::rest::dto::{GearItemDto, GearItemRequest, GearKitDto, GearKitRequest};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, PathParam, data};
use crate::api::rest::middleware::Authz;
use crate::domain::service::AppServices;

pub async fn list_items(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let items = svc.gear.list_items(&ctx).await?;
    let dtos: Vec<GearItemDto> = items.into_iter().map(Into::into).collect();
    Ok(data(dtos))
}

pub async fn get_item(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let item = svc.gear.get_item(&ctx, id).await?;
    Ok(data(GearItemDto::from(item)))
}

pub async fn create_item(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<GearItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let item = svc.gear.create_item(&ctx, req.into_draft()?).await?;
    Ok((StatusCode::CREATED, data(GearItemDto::from(item))))
}

pub async fn replace_item(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<GearItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let item = svc.gear.replace_item(&ctx, id, req.into_draft()?).await?;
    Ok(data(GearItemDto::from(item)))
}

pub async fn delete_item(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    svc.gear.delete_item(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_kits(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let kits = svc.gear.list_kits(&ctx).await?;
    let dtos: Vec<GearKitDto> = kits.into_iter().map(Into::into).collect();
    Ok(data(dtos))
}

pub async fn get_kit(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let kit = svc.gear.get_kit(&ctx, id).await?;
    Ok(data(GearKitDto::from(kit)))
}

pub async fn create_kit(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<GearKitRequest>,
) -> ApiResult<impl IntoResponse> {
    let kit = svc.gear.create_kit(&ctx, req.into()).await?;
    Ok((StatusCode::CREATED, data(GearKitDto::from(kit))))
}

pub async fn replace_kit(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<GearKitRequest>,
) -> ApiResult<impl IntoResponse> {
    let kit = svc.gear.replace_kit(&ctx, id, req.into()).await?;
    Ok(data(GearKitDto::from(kit)))
}

pub async fn delete_kit(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    svc.gear.delete_kit(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
