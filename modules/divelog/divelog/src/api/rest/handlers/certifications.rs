use axum::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::api::rest::dto::{CertificationDefinitionDto, CertificationDto, NewCertificationRequest};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, PathParam, data};
use crate::api::rest::middleware::Authz;
use crate::domain::service::AppServices;

/// Public catalogue; no session needed.
pub async fn list_definitions(
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let definitions = svc.certifications.list_definitions().await?;
    let dtos: Vec<CertificationDefinitionDto> = definitions.into_iter().map(Into::into).collect();
    Ok(data(dtos))
}

pub async fn list_certifications(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let certifications = svc.certifications.list_certifications(&ctx).await?;
    let dtos: Vec<CertificationDto> = certifications.into_iter().map(Into::into).collect();
    Ok(data(dtos))
}

pub async fn add_certification(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<NewCertificationRequest>,
) -> ApiResult<impl IntoResponse> {
    let certification = svc
        .certifications
        .add_certification(&ctx, req.into())
        .await?;
    Ok((StatusCode::CREATED, data(CertificationDto::from(certification))))
}

pub async fn remove_certification(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    svc.certifications.remove_certification(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
