//! # AppError
//!
//! Centralized error handling for the Fritter ecosystem.
//! Validation failures are returned typed to the caller, never clamped.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// The author has no draft in progress
    #[error("no draft exists for author {0}")]
    DraftNotFound(Uuid),

    #[error("freet not found with ID {0}")]
    FreetNotFound(Uuid),

    #[error("comment not found with ID {0}")]
    CommentNotFound(Uuid),

    #[error("reaction not found with ID {0}")]
    ReactionNotFound(Uuid),

    #[error("flag not found with ID {0}")]
    FlagNotFound(Uuid),

    /// Non-positive split offset (zero is the only representable offender)
    #[error("split offset must be a positive number")]
    InvalidOffset,

    /// Offset beyond the content, or a cut that yields a zero-length segment
    #[error("split offset {offset} is out of range for content of length {len}")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("segment of {len} chars exceeds the {max}-char limit")]
    SegmentTooLong { len: usize, max: usize },

    #[error("content must be at least one character long")]
    ContentEmpty,

    #[error("vote must be -1, 0 or 1, got {0}")]
    InvalidVote(i8),

    /// Ownership/permission failure (e.g. flagging someone else's freet)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g. store unavailable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a store-level failure. Detail is preserved for logging; the
    /// HTTP layer redacts it.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// A specialized Result type for Fritter logic.
pub type Result<T> = std::result::Result<T, AppError>;
