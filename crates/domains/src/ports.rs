//! # Ports
//!
//! Store contracts the services depend on. Any persistence adapter must
//! implement these traits to be wired into the binary.
//!
//! All lookups return `Ok(None)` for "not found"; adapters reserve `Err`
//! for infrastructure failures. Uniqueness rules ("at most one draft per
//! author", "at most one reaction per voter+freet", "at most one flag per
//! freet") are part of the contract and enforced by the adapter.

use crate::models::{Comment, Draft, Flag, Freet, Reaction};
use async_trait::async_trait;
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use uuid::Uuid;

/// Persistence for in-progress splitter drafts.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Draft>>;
    /// At most one draft per author.
    async fn find_by_author(&self, author_id: Uuid) -> anyhow::Result<Option<Draft>>;
    async fn save(&self, draft: &Draft) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Persistence for published freets and their comments, and the identity
/// lookup (`author_of`) moderation needs.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait FreetStore: Send + Sync {
    async fn create_freet(&self, freet: &Freet) -> anyhow::Result<()>;
    async fn get_freet(&self, id: Uuid) -> anyhow::Result<Option<Freet>>;
    /// Resolves the original author of a freet.
    async fn author_of(&self, freet_id: Uuid) -> anyhow::Result<Option<Uuid>>;

    async fn create_comment(&self, comment: &Comment) -> anyhow::Result<()>;
    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>>;
    /// Newest-first, a display-order choice (the splitter inserts oldest-first).
    async fn comments_for_freet(&self, freet_id: Uuid) -> anyhow::Result<Vec<Comment>>;
    async fn comments_by_author(&self, author_id: Uuid) -> anyhow::Result<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()>;
    async fn delete_comments_by_author(&self, author_id: Uuid) -> anyhow::Result<()>;
}

/// Persistence for votes, including the count queries the flag lifecycle
/// reads.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ReactionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Reaction>>;
    /// At most one reaction per (voter, freet) pair.
    async fn find_by_voter_and_freet(
        &self,
        voter_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Option<Reaction>>;
    async fn list_all(&self) -> anyhow::Result<Vec<Reaction>>;
    async fn list_for_freet(&self, freet_id: Uuid) -> anyhow::Result<Vec<Reaction>>;
    async fn list_by_voter(&self, voter_id: Uuid) -> anyhow::Result<Vec<Reaction>>;
    async fn count_upvotes(&self, freet_id: Uuid) -> anyhow::Result<u64>;
    async fn count_downvotes(&self, freet_id: Uuid) -> anyhow::Result<u64>;
    /// Insert-or-replace keyed on `id`.
    async fn save(&self, reaction: &Reaction) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<()>;
    async fn delete_by_voter(&self, voter_id: Uuid) -> anyhow::Result<()>;
}

/// Persistence for moderation flags.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Flag>>;
    /// At most one flag per freet.
    async fn find_by_freet(&self, freet_id: Uuid) -> anyhow::Result<Option<Flag>>;
    async fn list_all(&self) -> anyhow::Result<Vec<Flag>>;
    /// Insert-or-replace keyed on `id`.
    async fn save(&self, flag: &Flag) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<()>;
}
