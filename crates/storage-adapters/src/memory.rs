//! # In-memory stores
//!
//! DashMap-backed implementations of the domain ports. The default for
//! local development and the integration-test suite; state dies with the
//! process.
//!
//! The uniqueness rules the ports promise (one draft per author, one
//! reaction per voter+freet, one flag per freet) are enforced here on
//! save, mirroring what the SQLite adapter gets from UNIQUE constraints.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    Comment, Draft, DraftStore, Flag, FlagStore, Freet, FreetStore, Reaction, ReactionStore,
    VoteValue,
};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: DashMap<Uuid, Draft>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Draft>> {
        Ok(self.drafts.get(&id).map(|d| d.clone()))
    }

    async fn find_by_author(&self, author_id: Uuid) -> anyhow::Result<Option<Draft>> {
        Ok(self
            .drafts
            .iter()
            .find(|entry| entry.author_id == author_id)
            .map(|entry| entry.clone()))
    }

    async fn save(&self, draft: &Draft) -> anyhow::Result<()> {
        // one draft per author
        self.drafts
            .retain(|id, d| *id == draft.id || d.author_id != draft.author_id);
        self.drafts.insert(draft.id, draft.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.drafts.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFreetStore {
    freets: DashMap<Uuid, Freet>,
    comments: DashMap<Uuid, Comment>,
}

impl MemoryFreetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FreetStore for MemoryFreetStore {
    async fn create_freet(&self, freet: &Freet) -> anyhow::Result<()> {
        self.freets.insert(freet.id, freet.clone());
        Ok(())
    }

    async fn get_freet(&self, id: Uuid) -> anyhow::Result<Option<Freet>> {
        Ok(self.freets.get(&id).map(|f| f.clone()))
    }

    async fn author_of(&self, freet_id: Uuid) -> anyhow::Result<Option<Uuid>> {
        Ok(self.freets.get(&freet_id).map(|f| f.author_id))
    }

    async fn create_comment(&self, comment: &Comment) -> anyhow::Result<()> {
        self.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn comments_for_freet(&self, freet_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.freet_id == freet_id)
            .map(|entry| entry.clone())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn comments_by_author(&self, author_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.author_id == author_id)
            .map(|entry| entry.clone())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()> {
        self.comments.remove(&id);
        Ok(())
    }

    async fn delete_comments_by_author(&self, author_id: Uuid) -> anyhow::Result<()> {
        self.comments.retain(|_, c| c.author_id != author_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryReactionStore {
    reactions: DashMap<Uuid, Reaction>,
}

impl MemoryReactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self, freet_id: Uuid, value: VoteValue) -> u64 {
        self.reactions
            .iter()
            .filter(|entry| entry.freet_id == freet_id && entry.value == value)
            .count() as u64
    }
}

#[async_trait]
impl ReactionStore for MemoryReactionStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Reaction>> {
        Ok(self.reactions.get(&id).map(|r| r.clone()))
    }

    async fn find_by_voter_and_freet(
        &self,
        voter_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Option<Reaction>> {
        Ok(self
            .reactions
            .iter()
            .find(|entry| entry.voter_id == voter_id && entry.freet_id == freet_id)
            .map(|entry| entry.clone()))
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Reaction>> {
        Ok(self.reactions.iter().map(|entry| entry.clone()).collect())
    }

    async fn list_for_freet(&self, freet_id: Uuid) -> anyhow::Result<Vec<Reaction>> {
        Ok(self
            .reactions
            .iter()
            .filter(|entry| entry.freet_id == freet_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn list_by_voter(&self, voter_id: Uuid) -> anyhow::Result<Vec<Reaction>> {
        Ok(self
            .reactions
            .iter()
            .filter(|entry| entry.voter_id == voter_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn count_upvotes(&self, freet_id: Uuid) -> anyhow::Result<u64> {
        Ok(self.count(freet_id, VoteValue::Up))
    }

    async fn count_downvotes(&self, freet_id: Uuid) -> anyhow::Result<u64> {
        Ok(self.count(freet_id, VoteValue::Down))
    }

    async fn save(&self, reaction: &Reaction) -> anyhow::Result<()> {
        // one reaction per (voter, freet)
        self.reactions.retain(|id, r| {
            *id == reaction.id
                || r.voter_id != reaction.voter_id
                || r.freet_id != reaction.freet_id
        });
        self.reactions.insert(reaction.id, reaction.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.reactions.remove(&id);
        Ok(())
    }

    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<()> {
        self.reactions.retain(|_, r| r.freet_id != freet_id);
        Ok(())
    }

    async fn delete_by_voter(&self, voter_id: Uuid) -> anyhow::Result<()> {
        self.reactions.retain(|_, r| r.voter_id != voter_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFlagStore {
    flags: DashMap<Uuid, Flag>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Flag>> {
        Ok(self.flags.get(&id).map(|f| f.clone()))
    }

    async fn find_by_freet(&self, freet_id: Uuid) -> anyhow::Result<Option<Flag>> {
        Ok(self
            .flags
            .iter()
            .find(|entry| entry.freet_id == freet_id)
            .map(|entry| entry.clone()))
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Flag>> {
        Ok(self.flags.iter().map(|entry| entry.clone()).collect())
    }

    async fn save(&self, flag: &Flag) -> anyhow::Result<()> {
        // one flag per freet
        self.flags
            .retain(|id, f| *id == flag.id || f.freet_id != flag.freet_id);
        self.flags.insert(flag.id, flag.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.flags.remove(&id);
        Ok(())
    }

    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<()> {
        self.flags.retain(|_, f| f.freet_id != freet_id);
        Ok(())
    }
}
