//! # Comments
//!
//! Plain comment CRUD. The splitter writes comments through the store
//! directly (it controls timestamps); this service fronts the user-facing
//! operations with the same content rules freets have.

use domains::{AppError, Comment, FreetStore, Result};
use std::sync::Arc;
use uuid::Uuid;

pub struct CommentService {
    freets: Arc<dyn FreetStore>,
    max_segment_len: usize,
}

impl CommentService {
    pub fn new(freets: Arc<dyn FreetStore>, max_segment_len: usize) -> Self {
        Self {
            freets,
            max_segment_len,
        }
    }

    pub async fn add(&self, author_id: Uuid, freet_id: Uuid, content: &str) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::ContentEmpty);
        }
        let len = content.chars().count();
        if len > self.max_segment_len {
            return Err(AppError::SegmentTooLong {
                len,
                max: self.max_segment_len,
            });
        }
        if self.freets.get_freet(freet_id).await?.is_none() {
            return Err(AppError::FreetNotFound(freet_id));
        }
        let comment = Comment {
            id: Uuid::now_v7(),
            author_id,
            freet_id,
            content: content.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.freets.create_comment(&comment).await?;
        Ok(comment)
    }

    pub async fn get(&self, comment_id: Uuid) -> Result<Comment> {
        self.freets
            .get_comment(comment_id)
            .await?
            .ok_or(AppError::CommentNotFound(comment_id))
    }

    /// Newest-first, the display order.
    pub async fn list_for_freet(&self, freet_id: Uuid) -> Result<Vec<Comment>> {
        if self.freets.get_freet(freet_id).await?.is_none() {
            return Err(AppError::FreetNotFound(freet_id));
        }
        Ok(self.freets.comments_for_freet(freet_id).await?)
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Comment>> {
        Ok(self.freets.comments_by_author(author_id).await?)
    }

    /// Authors can only delete their own comments.
    pub async fn delete(&self, caller: Uuid, comment_id: Uuid) -> Result<()> {
        let comment = self.get(comment_id).await?;
        if comment.author_id != caller {
            return Err(AppError::Unauthorized(
                "cannot modify other users' comments".to_string(),
            ));
        }
        self.freets.delete_comment(comment.id).await?;
        Ok(())
    }

    /// Removes everything the author ever commented (account deletion).
    pub async fn delete_all_by_author(&self, author_id: Uuid) -> Result<()> {
        self.freets.delete_comments_by_author(author_id).await?;
        Ok(())
    }
}
