//! # Caller identity
//!
//! Session management is an upstream concern; by the time a request gets
//! here the session layer has resolved the caller and stamped the
//! `x-user-id` header. Handlers that need an identity extract `UserId`
//! and get a 401 when the header is missing or malformed.

use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::header::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

pub fn user_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(ApiError::Unauthenticated)
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers).map(UserId)
    }
}
