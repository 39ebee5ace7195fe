use axum::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::display_preferences;
use crate::api::rest::dto::{PlanDto, PlanRequest};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, PathParam, data};
use crate::api::rest::middleware::Authz;
use crate::domain::service::AppServices;

pub async fn list_plans(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let plans = svc.plans.list_plans(&ctx).await?;
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    let dtos: Vec<PlanDto> = plans.into_iter().map(|p| PlanDto::new(p, &prefs)).collect();
    Ok(data(dtos))
}

pub async fn get_plan(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let plan = svc.plans.get_plan(&ctx, id).await?;
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    Ok(data(PlanDto::new(plan, &prefs)))
}

pub async fn create_plan(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<PlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    let plan = svc.plans.create_plan(&ctx, req.into_draft(&prefs)?).await?;
    Ok((StatusCode::CREATED, data(PlanDto::new(plan, &prefs))))
}

pub async fn replace_plan(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req): JsonBody<PlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let prefs = display_preferences(&svc.preferences, &ctx).await;
    let plan = svc
        .plans
        .replace_plan(&ctx, id, req.into_draft(&prefs)?)
        .await?;
    Ok(data(PlanDto::new(plan, &prefs)))
}

pub async fn delete_plan(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    svc.plans.delete_plan(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
