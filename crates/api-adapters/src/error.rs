//! # HTTP error mapping
//!
//! Translates domain failures into status codes: validation kinds → 400
//! (413 for oversized segments), not-found kinds → 404, ownership
//! violations → 403, missing identity → 401. Store failures become an
//! opaque 500; the detail only reaches the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::AppError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    /// No usable caller identity on the request.
    Unauthenticated,
    /// Malformed request shape (missing/contradictory fields).
    BadRequest(String),
    /// Resource lookups that have no dedicated domain error.
    NotFound(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "you must be logged in to do that".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::App(err) => {
                let status = match &err {
                    AppError::DraftNotFound(_)
                    | AppError::FreetNotFound(_)
                    | AppError::CommentNotFound(_)
                    | AppError::ReactionNotFound(_)
                    | AppError::FlagNotFound(_) => StatusCode::NOT_FOUND,
                    AppError::InvalidOffset
                    | AppError::OffsetOutOfRange { .. }
                    | AppError::ContentEmpty
                    | AppError::InvalidVote(_) => StatusCode::BAD_REQUEST,
                    AppError::SegmentTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
                    AppError::Internal(detail) => {
                        error!(detail = %detail, "request failed on a store error");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": "internal service error"})),
                        )
                            .into_response();
                    }
                };
                (status, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
