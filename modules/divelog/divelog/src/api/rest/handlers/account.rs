use axum::Extension;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;

use crate::api::rest::dto::{
    ChangePasswordRequest, DeleteAccountRequest, UpdateProfileRequest, UserDto,
};
use crate::api::rest::error::ApiResult;
use crate::api::rest::extract::{JsonBody, data};
use crate::api::rest::middleware::{Authz, CookiePolicy};
use crate::domain::service::AppServices;

pub async fn get_account(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
) -> ApiResult<impl IntoResponse> {
    let profile = svc.account.me(&ctx).await?;
    Ok(data(UserDto::from(profile)))
}

pub async fn update_account(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = svc.account.update_profile(&ctx, &req.display_name).await?;
    Ok(data(UserDto::from(profile)))
}

/// Re-issues the session cookie for this client; every other session is invalidated.
pub async fn change_password(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    Extension(cookies): Extension<CookiePolicy>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let grant = svc
        .account
        .change_password(&ctx, &req.current_password, &req.new_password)
        .await?;
    let cookie = cookies.issue(&grant.token)?;
    Ok(([(SET_COOKIE, cookie)], data(UserDto::from(grant.profile))))
}

pub async fn delete_account(
    Authz(ctx): Authz,
    Extension(svc): Extension<AppServices>,
    Extension(cookies): Extension<CookiePolicy>,
    JsonBody(req): JsonBody<DeleteAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    svc.account.delete_account(&ctx, &req.password).await?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookies.clear())]))
}
