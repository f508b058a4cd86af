//! # Response shaping
//!
//! Transforms raw domain records into the objects the frontend expects.
//! Timestamps go out as RFC 3339 strings; vote values as raw scores.

use domains::{Comment, Draft, Flag, Freet, Reaction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub split_offsets: Vec<usize>,
}

impl From<Draft> for DraftResponse {
    fn from(draft: Draft) -> Self {
        Self {
            id: draft.id,
            author_id: draft.author_id,
            split_offsets: draft.split_offsets.iter().copied().collect(),
            content: draft.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FreetResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: String,
}

impl From<Freet> for FreetResponse {
    fn from(freet: Freet) -> Self {
        Self {
            id: freet.id,
            author_id: freet.author_id,
            content: freet.content,
            created_at: freet.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub freet_id: Uuid,
    pub content: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            freet_id: comment.freet_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub freet_id: Uuid,
    pub vote: i8,
}

impl From<Reaction> for ReactionResponse {
    fn from(reaction: Reaction) -> Self {
        Self {
            id: reaction.id,
            voter_id: reaction.voter_id,
            freet_id: reaction.freet_id,
            vote: reaction.value.score(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub id: Uuid,
    pub freet_id: Uuid,
    pub moderator_id: Option<Uuid>,
}

impl From<Flag> for FlagResponse {
    fn from(flag: Flag) -> Self {
        Self {
            id: flag.id,
            freet_id: flag.freet_id,
            moderator_id: flag.moderator_id,
        }
    }
}

// ── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSplitRequest {
    pub content: Option<String>,
    #[serde(default)]
    pub offsets: Vec<usize>,
    /// When true, materialize the existing draft instead of creating one.
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Deserialize)]
pub struct PatchSplitRequest {
    pub content: Option<String>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CastReactionRequest {
    pub freet_id: Uuid,
    pub vote: i8,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub freet_id: Uuid,
    pub content: String,
}
