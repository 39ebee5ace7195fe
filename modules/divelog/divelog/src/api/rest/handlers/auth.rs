use axum::Extension;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;

use crate::api::rest::dto::{LoginRequest, RegisterRequest, UserDto};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, data};
use crate::api::rest::middleware::CookiePolicy;
use crate::domain::service::AppServices;

pub async fn register(
    Extension(svc): Extension<AppServices>,
    Extension(cookies): Extension<CookiePolicy>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let grant = svc
        .account
        .register(&req.email, &req.display_name, &req.password)
        .await?;
    let cookie = cookies.issue(&grant.token)?;
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        data(UserDto::from(grant.profile)),
    ))
}

pub async fn login(
    Extension(svc): Extension<AppServices>,
    Extension(cookies): Extension<CookiePolicy>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let grant = svc.account.login(&req.email, &req.password).await?;
    let cookie = cookies.issue(&grant.token)?;
    Ok(([(SET_COOKIE, cookie)], data(UserDto::from(grant.profile))))
}

pub async fn logout(Extension(cookies): Extension<CookiePolicy>) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookies.clear())])
}
