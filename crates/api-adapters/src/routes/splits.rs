//! Splitter endpoints: one draft per caller, edited in place until it is
//! either published (freet + comments) or discarded.

use crate::dto::{CreateSplitRequest, DraftResponse, FreetResponse, PatchSplitRequest};
use crate::error::{ApiError, ApiResult};
use crate::identity::UserId;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// GET /api/splits: the caller's draft in progress.
pub async fn get_split(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> ApiResult<Json<Value>> {
    let draft = state.splitter.get(user).await?;
    Ok(Json(json!({ "draft": DraftResponse::from(draft) })))
}

/// POST /api/splits: starts a draft, or with `publish: true` turns the
/// existing draft into a freet headed by the returned record.
pub async fn create_or_publish(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(body): Json<CreateSplitRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if body.publish {
        let freet = state.splitter.materialize(user).await?;
        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "your draft was published successfully",
                "freet": FreetResponse::from(freet),
            })),
        ));
    }

    let content = body
        .content
        .ok_or_else(|| ApiError::BadRequest("content is required to start a draft".into()))?;
    let draft = state.splitter.create(user, &content, &body.offsets).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "your draft was created successfully",
            "draft": DraftResponse::from(draft),
        })),
    ))
}

/// PATCH /api/splits: toggles a split point, or replaces the content
/// (evicting any split point past the new end).
pub async fn patch_split(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(body): Json<PatchSplitRequest>,
) -> ApiResult<Json<Value>> {
    if let Some(offset) = body.offset {
        let draft = state.splitter.set_offset(user, offset).await?;
        return Ok(Json(json!({
            "message": "your split point was toggled successfully",
            "draft": DraftResponse::from(draft),
        })));
    }

    let content = body
        .content
        .ok_or_else(|| ApiError::BadRequest("provide new content or a split offset".into()))?;
    let draft = state.splitter.set_content(user, &content).await?;
    Ok(Json(json!({
        "message": "your draft was updated successfully",
        "draft": DraftResponse::from(draft),
    })))
}

/// DELETE /api/splits: throws the draft away.
pub async fn discard_split(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> ApiResult<Json<Value>> {
    state.splitter.discard(user).await?;
    Ok(Json(json!({
        "message": "your draft was deleted successfully",
    })))
}
