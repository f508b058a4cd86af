//! # Reactions
//!
//! A reaction is one user's directional signal on a freet. There is at
//! most one per (voter, freet); casting a zero deletes the record instead
//! of storing it. Every vote change is followed by a flag refresh so the
//! moderation state tracks controversy.

use crate::flags::FlagService;
use domains::{AppError, FreetStore, Reaction, ReactionStore, Result, VoteValue};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct ReactionService {
    reactions: Arc<dyn ReactionStore>,
    freets: Arc<dyn FreetStore>,
    flags: FlagService,
}

impl ReactionService {
    pub fn new(
        reactions: Arc<dyn ReactionStore>,
        freets: Arc<dyn FreetStore>,
        flags: FlagService,
    ) -> Self {
        Self {
            reactions,
            freets,
            flags,
        }
    }

    /// Casts or updates the voter's reaction to a freet. A `score` of zero
    /// withdraws any existing vote. Returns the stored reaction, or `None`
    /// when the net effect is "no active vote".
    pub async fn cast(
        &self,
        voter_id: Uuid,
        freet_id: Uuid,
        score: i8,
    ) -> Result<Option<Reaction>> {
        self.ensure_freet(freet_id).await?;
        let existing = self
            .reactions
            .find_by_voter_and_freet(voter_id, freet_id)
            .await?;

        let result = if score == 0 {
            if let Some(reaction) = existing {
                debug!(voter = %voter_id, freet = %freet_id, "withdrawing vote");
                self.reactions.delete(reaction.id).await?;
            }
            None
        } else {
            let value =
                VoteValue::try_from(score).map_err(|_| AppError::InvalidVote(score))?;
            let reaction = match existing {
                Some(mut reaction) => {
                    reaction.value = value;
                    reaction
                }
                None => Reaction {
                    id: Uuid::now_v7(),
                    voter_id,
                    freet_id,
                    value,
                },
            };
            self.reactions.save(&reaction).await?;
            Some(reaction)
        };

        // moderation tracks every vote change
        self.flags.refresh_for_freet(freet_id).await?;
        Ok(result)
    }

    /// Deletes the caller's own reaction by id.
    pub async fn withdraw(&self, caller: Uuid, reaction_id: Uuid) -> Result<()> {
        let reaction = self
            .reactions
            .load(reaction_id)
            .await?
            .ok_or(AppError::ReactionNotFound(reaction_id))?;
        if reaction.voter_id != caller {
            return Err(AppError::Unauthorized(
                "cannot modify other users' reactions".to_string(),
            ));
        }
        self.reactions.delete(reaction.id).await?;
        self.flags.refresh_for_freet(reaction.freet_id).await?;
        Ok(())
    }

    /// The caller's active vote on a freet, if any.
    pub async fn find_for_voter_and_freet(
        &self,
        voter_id: Uuid,
        freet_id: Uuid,
    ) -> Result<Option<Reaction>> {
        self.ensure_freet(freet_id).await?;
        Ok(self
            .reactions
            .find_by_voter_and_freet(voter_id, freet_id)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Reaction>> {
        Ok(self.reactions.list_all().await?)
    }

    pub async fn list_for_freet(&self, freet_id: Uuid) -> Result<Vec<Reaction>> {
        self.ensure_freet(freet_id).await?;
        Ok(self.reactions.list_for_freet(freet_id).await?)
    }

    pub async fn list_by_voter(&self, voter_id: Uuid) -> Result<Vec<Reaction>> {
        Ok(self.reactions.list_by_voter(voter_id).await?)
    }

    async fn ensure_freet(&self, freet_id: Uuid) -> Result<()> {
        if self.freets.get_freet(freet_id).await?.is_none() {
            return Err(AppError::FreetNotFound(freet_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Freet, MockFlagStore, MockFreetStore, MockReactionStore};
    use std::sync::Mutex;

    fn existing_freet() -> MockFreetStore {
        let mut freets = MockFreetStore::new();
        freets.expect_get_freet().returning(|id| {
            Ok(Some(Freet {
                id,
                author_id: Uuid::now_v7(),
                content: "a freet".to_string(),
                created_at: chrono::Utc::now(),
            }))
        });
        freets
    }

    fn quiet_flags() -> FlagService {
        // find_by_freet: no flag; counts stay below the threshold so the
        // refresh never writes
        let mut flags = MockFlagStore::new();
        flags.expect_find_by_freet().returning(|_| Ok(None));
        let mut reactions = MockReactionStore::new();
        reactions.expect_count_upvotes().returning(|_| Ok(0));
        reactions.expect_count_downvotes().returning(|_| Ok(0));
        FlagService::new(
            Arc::new(flags),
            Arc::new(reactions),
            Arc::new(MockFreetStore::new()),
        )
    }

    #[tokio::test]
    async fn cast_stores_a_single_reaction_per_voter_and_freet() {
        let voter = Uuid::now_v7();
        let freet_id = Uuid::now_v7();

        let stored = Arc::new(Mutex::new(None::<Reaction>));
        let mut reactions = MockReactionStore::new();
        {
            let store = stored.clone();
            reactions
                .expect_find_by_voter_and_freet()
                .returning(move |_, _| Ok(store.lock().unwrap().clone()));
        }
        {
            let store = stored.clone();
            reactions.expect_save().times(2).returning(move |r| {
                *store.lock().unwrap() = Some(r.clone());
                Ok(())
            });
        }

        let svc = ReactionService::new(
            Arc::new(reactions),
            Arc::new(existing_freet()),
            quiet_flags(),
        );

        let first = svc.cast(voter, freet_id, 1).await.unwrap().unwrap();
        let second = svc.cast(voter, freet_id, -1).await.unwrap().unwrap();
        // same record flipped, not a second one
        assert_eq!(first.id, second.id);
        assert_eq!(second.value, VoteValue::Down);
    }

    #[tokio::test]
    async fn cast_zero_deletes_the_existing_reaction() {
        let voter = Uuid::now_v7();
        let freet_id = Uuid::now_v7();
        let reaction = Reaction {
            id: Uuid::now_v7(),
            voter_id: voter,
            freet_id,
            value: VoteValue::Up,
        };
        let reaction_id = reaction.id;

        let mut reactions = MockReactionStore::new();
        reactions
            .expect_find_by_voter_and_freet()
            .returning(move |_, _| Ok(Some(reaction.clone())));
        reactions
            .expect_delete()
            .withf(move |id| *id == reaction_id)
            .times(1)
            .returning(|_| Ok(()));
        reactions.expect_save().times(0);

        let svc = ReactionService::new(
            Arc::new(reactions),
            Arc::new(existing_freet()),
            quiet_flags(),
        );
        assert!(svc.cast(voter, freet_id, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cast_rejects_out_of_range_scores() {
        let mut reactions = MockReactionStore::new();
        reactions
            .expect_find_by_voter_and_freet()
            .returning(|_, _| Ok(None));

        let svc = ReactionService::new(
            Arc::new(reactions),
            Arc::new(existing_freet()),
            quiet_flags(),
        );
        let err = svc.cast(Uuid::now_v7(), Uuid::now_v7(), 2).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidVote(2)));
    }

    #[tokio::test]
    async fn cast_fails_for_missing_freet() {
        let mut freets = MockFreetStore::new();
        freets.expect_get_freet().returning(|_| Ok(None));

        let svc = ReactionService::new(
            Arc::new(MockReactionStore::new()),
            Arc::new(freets),
            quiet_flags(),
        );
        let err = svc.cast(Uuid::now_v7(), Uuid::now_v7(), 1).await.unwrap_err();
        assert!(matches!(err, AppError::FreetNotFound(_)));
    }

    #[tokio::test]
    async fn withdraw_rejects_other_users_reactions() {
        let owner = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let reaction = Reaction {
            id: Uuid::now_v7(),
            voter_id: owner,
            freet_id: Uuid::now_v7(),
            value: VoteValue::Up,
        };
        let reaction_id = reaction.id;

        let mut reactions = MockReactionStore::new();
        reactions
            .expect_load()
            .returning(move |_| Ok(Some(reaction.clone())));
        reactions.expect_delete().times(0);

        let svc = ReactionService::new(
            Arc::new(reactions),
            Arc::new(existing_freet()),
            quiet_flags(),
        );
        let err = svc.withdraw(stranger, reaction_id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
