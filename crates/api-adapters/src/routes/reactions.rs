//! Reaction endpoints. Reads are public; casting and withdrawing need an
//! identity. An absent own-vote reads back as a zero score rather than a
//! 404, which keeps the frontend's toggle logic simple.

use crate::dto::{CastReactionRequest, ReactionResponse};
use crate::error::ApiResult;
use crate::identity::user_from_headers;
use crate::identity::UserId;
use crate::routes::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReactionQuery {
    pub freet_id: Option<Uuid>,
    /// With `freet_id`, narrows the result to the caller's own vote.
    #[serde(default)]
    pub mine: bool,
}

/// GET /api/reactions: all reactions, a freet's reactions, or the
/// caller's own vote on a freet.
pub async fn list_reactions(
    State(state): State<AppState>,
    Query(query): Query<ReactionQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let Some(freet_id) = query.freet_id else {
        let all: Vec<ReactionResponse> = state
            .reactions
            .list_all()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        return Ok(Json(json!(all)));
    };

    if query.mine {
        let user = user_from_headers(&headers)?;
        return Ok(Json(
            match state
                .reactions
                .find_for_voter_and_freet(user, freet_id)
                .await?
            {
                Some(reaction) => json!(ReactionResponse::from(reaction)),
                None => json!({ "voter_id": user, "freet_id": freet_id, "vote": 0 }),
            },
        ));
    }

    let reactions: Vec<ReactionResponse> = state
        .reactions
        .list_for_freet(freet_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(json!(reactions)))
}

/// POST /api/reactions: cast, flip or (with a zero vote) withdraw.
pub async fn cast_reaction(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(body): Json<CastReactionRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let reaction = state.reactions.cast(user, body.freet_id, body.vote).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "your reaction was recorded successfully",
            "reaction": reaction.map(ReactionResponse::from),
        })),
    ))
}

/// DELETE /api/reactions/{reaction_id}: withdraw the caller's reaction.
pub async fn delete_reaction(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(reaction_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state.reactions.withdraw(user, reaction_id).await?;
    Ok(Json(json!({
        "message": "your reaction was deleted successfully",
    })))
}
