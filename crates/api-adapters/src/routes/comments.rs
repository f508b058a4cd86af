//! Comment endpoints.

use crate::dto::{CommentResponse, CreateCommentRequest};
use crate::error::ApiResult;
use crate::identity::UserId;
use crate::routes::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub freet_id: Uuid,
}

/// GET /api/comments?freet_id: a freet's comments, newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> ApiResult<Json<Value>> {
    let comments: Vec<CommentResponse> = state
        .comments
        .list_for_freet(query.freet_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(json!(comments)))
}

/// POST /api/comments: comment on a freet.
pub async fn create_comment(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(body): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let comment = state
        .comments
        .add(user, body.freet_id, &body.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "your comment was created successfully",
            "comment": CommentResponse::from(comment),
        })),
    ))
}

/// DELETE /api/comments/{comment_id}: delete the caller's own comment.
pub async fn delete_comment(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state.comments.delete(user, comment_id).await?;
    Ok(Json(json!({
        "message": "your comment was deleted successfully",
    })))
}
