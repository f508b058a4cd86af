//! # Splitter
//!
//! Converts a Draft into an immutable Freet plus ordered Comments, and
//! maintains draft invariants as content and split points change.
//!
//! Offsets are counted in chars. Sorting the offsets ascending and
//! appending the implicit terminal offset (the content length) yields the
//! cut points; every consecutive gap, starting from the implicit 0, must be
//! strictly positive and no larger than the configured segment limit.

use chrono::{Duration, Utc};
use domains::{AppError, Comment, Draft, DraftStore, Freet, FreetStore, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct SplitterService {
    drafts: Arc<dyn DraftStore>,
    freets: Arc<dyn FreetStore>,
    max_segment_len: usize,
}

impl SplitterService {
    pub fn new(
        drafts: Arc<dyn DraftStore>,
        freets: Arc<dyn FreetStore>,
        max_segment_len: usize,
    ) -> Self {
        Self {
            drafts,
            freets,
            max_segment_len,
        }
    }

    /// Starts a fresh draft for the author, replacing any draft already in
    /// progress (at most one per author).
    pub async fn create(
        &self,
        author_id: Uuid,
        content: &str,
        offsets: &[usize],
    ) -> Result<Draft> {
        if content.trim().is_empty() {
            return Err(AppError::ContentEmpty);
        }
        if offsets.contains(&0) {
            return Err(AppError::InvalidOffset);
        }
        if let Some(existing) = self.drafts.find_by_author(author_id).await? {
            debug!(author = %author_id, "replacing existing draft");
            self.drafts.delete(existing.id).await?;
        }
        let draft = Draft {
            id: Uuid::now_v7(),
            author_id,
            content: content.to_string(),
            split_offsets: offsets.iter().copied().collect(),
        };
        self.drafts.save(&draft).await?;
        Ok(draft)
    }

    /// The author's current draft, if one exists.
    pub async fn get(&self, author_id: Uuid) -> Result<Draft> {
        self.drafts
            .find_by_author(author_id)
            .await?
            .ok_or(AppError::DraftNotFound(author_id))
    }

    /// Toggles membership of `offset` in the draft's split set: present
    /// offsets are removed, absent ones inserted.
    pub async fn set_offset(&self, author_id: Uuid, offset: usize) -> Result<Draft> {
        if offset == 0 {
            return Err(AppError::InvalidOffset);
        }
        let mut draft = self.get(author_id).await?;
        if !draft.split_offsets.remove(&offset) {
            draft.split_offsets.insert(offset);
        }
        self.drafts.save(&draft).await?;
        Ok(draft)
    }

    /// Replaces the draft content, then evicts every offset past the new
    /// end. The eviction is deliberate invariant repair, not an error:
    /// shrinking content must not leave dangling cut points.
    pub async fn set_content(&self, author_id: Uuid, new_content: &str) -> Result<Draft> {
        if new_content.trim().is_empty() {
            return Err(AppError::ContentEmpty);
        }
        let mut draft = self.get(author_id).await?;
        draft.content = new_content.to_string();
        let len = char_len(&draft.content);
        draft.split_offsets.retain(|&offset| offset <= len);
        self.drafts.save(&draft).await?;
        Ok(draft)
    }

    /// Checks the draft invariants without touching any store.
    ///
    /// Failures are reported in ascending offset order: an offset past the
    /// content yields `OffsetOutOfRange`, an oversized gap yields
    /// `SegmentTooLong`, and a zero-length terminal segment (an offset
    /// equal to the content length) yields `OffsetOutOfRange` because every
    /// gap must be strictly positive.
    pub fn validate(&self, draft: &Draft) -> Result<()> {
        let len = char_len(&draft.content);
        if len == 0 {
            return Err(AppError::ContentEmpty);
        }
        let mut prev = 0usize;
        for &offset in &draft.split_offsets {
            if offset > len {
                return Err(AppError::OffsetOutOfRange { offset, len });
            }
            let gap = offset - prev;
            if gap > self.max_segment_len {
                return Err(AppError::SegmentTooLong {
                    len: gap,
                    max: self.max_segment_len,
                });
            }
            prev = offset;
        }
        let tail = len - prev;
        if tail == 0 {
            // the largest offset coincides with the content end
            return Err(AppError::OffsetOutOfRange { offset: prev, len });
        }
        if tail > self.max_segment_len {
            return Err(AppError::SegmentTooLong {
                len: tail,
                max: self.max_segment_len,
            });
        }
        Ok(())
    }

    /// Cuts the draft into a head Freet plus trailing Comments and deletes
    /// the draft. Refuses to run (fails with the first validation error)
    /// rather than partially create anything.
    ///
    /// Comments are created sequentially in offset order, each insert
    /// observed before the next starts, with strictly increasing
    /// `created_at`, so a concurrent reader listing by creation order sees
    /// a sequence consistent with segment order.
    pub async fn materialize(&self, author_id: Uuid) -> Result<Freet> {
        let draft = self.get(author_id).await?;
        self.validate(&draft)?;

        let segments = cut_segments(&draft.content, &draft.split_offsets);
        info!(
            author = %author_id,
            segments = segments.len(),
            "publishing draft as freet + comments"
        );

        let base = Utc::now();
        let head = Freet {
            id: Uuid::now_v7(),
            author_id,
            content: segments[0].clone(),
            created_at: base,
        };
        self.freets.create_freet(&head).await?;

        for (i, segment) in segments[1..].iter().enumerate() {
            let comment = Comment {
                id: Uuid::now_v7(),
                author_id,
                freet_id: head.id,
                content: segment.clone(),
                created_at: base + Duration::milliseconds((i + 1) as i64),
            };
            self.freets.create_comment(&comment).await?;
        }

        self.drafts.delete(draft.id).await?;
        Ok(head)
    }

    /// Throws the draft away without publishing.
    pub async fn discard(&self, author_id: Uuid) -> Result<()> {
        let draft = self.get(author_id).await?;
        self.drafts.delete(draft.id).await?;
        Ok(())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Partitions `content` at the given char offsets. The concatenation of
/// the returned segments equals `content` exactly.
fn cut_segments(content: &str, offsets: &BTreeSet<usize>) -> Vec<String> {
    let mut segments = Vec::with_capacity(offsets.len() + 1);
    let mut rest = content;
    let mut prev = 0usize;
    for &offset in offsets {
        let cut = byte_index_at(rest, offset - prev);
        segments.push(rest[..cut].to_string());
        rest = &rest[cut..];
        prev = offset;
    }
    segments.push(rest.to_string());
    segments
}

/// Byte position of the `chars`-th char boundary in `s`.
fn byte_index_at(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
