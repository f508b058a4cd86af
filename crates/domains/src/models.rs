//! # Domain Models
//!
//! These structs represent the core entities of Fritter.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The fundamental unit of conversation: a published micro-post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Freet {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A reply attached to a Freet.
///
/// Comments created by the splitter carry strictly increasing `created_at`
/// values so segment order stays recoverable; listings are newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    /// The parent Freet this comment is posted under (reference only).
    pub freet_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// An in-progress composed text with candidate split points.
///
/// At most one Draft exists per author; the store enforces that identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    /// Cut points counted in chars. Invariant: every member lies in
    /// `(0, content-length]` and consecutive gaps never exceed the
    /// configured segment limit.
    pub split_offsets: BTreeSet<usize>,
}

/// A single user's directional signal on a Freet.
///
/// At most one Reaction per (voter, freet) pair. A "no vote" is the absence
/// of a record, never a stored zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub freet_id: Uuid,
    pub value: VoteValue,
}

/// Vote direction. Serialized as the raw score (`1` / `-1`) to match the
/// wire format the frontend already speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn score(self) -> i8 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl From<VoteValue> for i8 {
    fn from(v: VoteValue) -> i8 {
        v.score()
    }
}

impl TryFrom<i8> for VoteValue {
    type Error = String;

    fn try_from(score: i8) -> Result<Self, Self::Error> {
        match score {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(format!("vote score must be 1 or -1, got {other}")),
        }
    }
}

/// A moderation marker on a Freet.
///
/// `moderator_id == None` means auto-flagged by vote controversy with no
/// human confirmation yet; `Some` means the freet's author confirmed it.
/// "Not flagged" is the absence of a record, not a boolean field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub id: Uuid,
    pub freet_id: Uuid,
    pub moderator_id: Option<Uuid>,
}
