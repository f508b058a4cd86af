//! Flag endpoints. Manual flagging is reserved for the freet's author;
//! auto-flags come and go with vote controversy and are not directly
//! writable over HTTP.

use crate::dto::FlagResponse;
use crate::error::{ApiError, ApiResult};
use crate::identity::UserId;
use crate::routes::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{AppError, Flag};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FlagQuery {
    pub flag_id: Option<Uuid>,
    pub freet_id: Option<Uuid>,
}

/// GET /api/flags: all flags, one by id, or the flag on a given freet.
pub async fn list_flags(
    State(state): State<AppState>,
    Query(query): Query<FlagQuery>,
) -> ApiResult<Json<Value>> {
    if let Some(flag_id) = query.flag_id {
        let flag = state.flags.get(flag_id).await?;
        return Ok(Json(json!(FlagResponse::from(flag))));
    }
    if let Some(freet_id) = query.freet_id {
        let flag = state
            .flags
            .find_by_freet(freet_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("no flag exists for freet {freet_id}")))?;
        return Ok(Json(json!(FlagResponse::from(flag))));
    }
    let flags: Vec<FlagResponse> = state
        .flags
        .list_all()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(json!(flags)))
}

/// POST /api/flags/{freet_id}: manually flag the caller's own freet, or
/// escalate an existing auto-flag. Idempotent.
pub async fn flag_manually(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(freet_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    ensure_author(&state, freet_id, user).await?;
    let flag = state.flags.create_or_escalate(freet_id, Some(user)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "the freet was flagged successfully",
            "flag": FlagResponse::from(flag),
        })),
    ))
}

/// PUT /api/flags/{flag_id}: re-confirm an existing flag.
pub async fn confirm_flag(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(flag_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let flag = authorized_flag(&state, flag_id, user).await?;
    let flag = state.flags.assign_moderator(flag).await?;
    Ok(Json(json!({
        "message": "the flag was confirmed successfully",
        "flag": FlagResponse::from(flag),
    })))
}

/// DELETE /api/flags/{flag_id}: withdraw manual confirmation. The flag
/// survives only if the freet is still controversial on its own.
pub async fn unflag(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(flag_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let flag = authorized_flag(&state, flag_id, user).await?;
    let remaining = state.flags.clear_moderator(flag).await?;
    Ok(Json(json!({
        "message": "your flag was withdrawn successfully",
        "flag": remaining.map(FlagResponse::from),
    })))
}

async fn ensure_author(state: &AppState, freet_id: Uuid, user: Uuid) -> ApiResult<()> {
    let author = state.flags.freet_author(freet_id).await?;
    if author != user {
        return Err(AppError::Unauthorized(
            "only the freet's author can manage its flag".to_string(),
        )
        .into());
    }
    Ok(())
}

async fn authorized_flag(state: &AppState, flag_id: Uuid, user: Uuid) -> ApiResult<Flag> {
    let flag = state.flags.get(flag_id).await?;
    ensure_author(state, flag.freet_id, user).await?;
    Ok(flag)
}
