//! Request extractors.
//!
//! `ApiJson` wraps axum's `Json` so body deserialization failures (malformed
//! JSON, wrong types, unknown enum values) come back as the standard failure
//! envelope instead of axum's plain-text rejection. Every response this
//! server emits carries the `success` boolean, including these.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::ApiError;

/// JSON body extractor whose rejection is an [`ApiError::BadRequest`].
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
