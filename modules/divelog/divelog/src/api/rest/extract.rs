//! Extractors whose rejections use the JSON error envelope, and the success envelope.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use super::error::ApiError;

/// `axum::Json` with malformed bodies reported as 400 envelopes.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` with bad ids reported as 400 envelopes.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[must_use]
pub fn data<T: Serialize>(value: T) -> Json<Data<T>> {
    Json(Data { data: value })
}
