//! # Flag lifecycle
//!
//! Keeps the existence and moderator assignment of a freet's Flag in step
//! with vote activity and manual moderator action.
//!
//! Per freet there is either no flag (not flagged), an AUTO flag
//! (`moderator_id == None`, held up only by vote controversy) or a MANUAL
//! flag (`moderator_id` set to the freet's author). `reconcile` is the
//! single authoritative rule for deletion: an AUTO flag on a freet that is
//! no longer controversial is removed; everything else persists.

use domains::{AppError, Flag, FlagStore, FreetStore, ReactionStore, Result};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// The controversy heuristic: substantial engagement on both sides (more
/// than `MIN_VOTES` each) and a near-tie, the smaller count within
/// `MARGIN_PCT` percent of the larger.
pub fn is_controversial(upvotes: u64, downvotes: u64) -> bool {
    const MIN_VOTES: u64 = 3;
    const MARGIN_PCT: f64 = 20.0;

    if upvotes <= MIN_VOTES || downvotes <= MIN_VOTES {
        return false;
    }
    let larger = upvotes.max(downvotes) as f64;
    let smaller = upvotes.min(downvotes) as f64;
    let margin = (larger - smaller) / larger * 100.0;
    margin < MARGIN_PCT
}

#[derive(Clone)]
pub struct FlagService {
    flags: Arc<dyn FlagStore>,
    reactions: Arc<dyn ReactionStore>,
    freets: Arc<dyn FreetStore>,
}

impl FlagService {
    pub fn new(
        flags: Arc<dyn FlagStore>,
        reactions: Arc<dyn ReactionStore>,
        freets: Arc<dyn FreetStore>,
    ) -> Self {
        Self {
            flags,
            reactions,
            freets,
        }
    }

    pub async fn get(&self, flag_id: Uuid) -> Result<Flag> {
        self.flags
            .load(flag_id)
            .await?
            .ok_or(AppError::FlagNotFound(flag_id))
    }

    pub async fn find_by_freet(&self, freet_id: Uuid) -> Result<Option<Flag>> {
        self.ensure_freet(freet_id).await?;
        Ok(self.flags.find_by_freet(freet_id).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Flag>> {
        Ok(self.flags.list_all().await?)
    }

    /// Resolves the freet's original author, the only user allowed to act
    /// as its moderator.
    pub async fn freet_author(&self, freet_id: Uuid) -> Result<Uuid> {
        self.freets
            .author_of(freet_id)
            .await?
            .ok_or(AppError::FreetNotFound(freet_id))
    }

    /// Recomputes controversy from current vote counts. An AUTO flag with
    /// no reason left to exist is deleted; everything else is saved
    /// unchanged. Runs after every vote change and after every moderator
    /// change.
    pub async fn reconcile(&self, flag: Flag) -> Result<Option<Flag>> {
        let controversial = self.controversial_now(flag.freet_id).await?;
        if flag.moderator_id.is_none() && !controversial {
            info!(flag = %flag.id, freet = %flag.freet_id, "dropping stale auto-flag");
            self.flags.delete(flag.id).await?;
            return Ok(None);
        }
        self.flags.save(&flag).await?;
        Ok(Some(flag))
    }

    /// Confirms the flag manually: the freet's author becomes the
    /// moderator of record.
    pub async fn assign_moderator(&self, mut flag: Flag) -> Result<Flag> {
        let author = self.freet_author(flag.freet_id).await?;
        flag.moderator_id = Some(author);
        self.flags.save(&flag).await?;
        Ok(flag)
    }

    /// Withdraws manual confirmation. The flag survives only if the freet
    /// is still controversial on its own.
    pub async fn clear_moderator(&self, mut flag: Flag) -> Result<Option<Flag>> {
        flag.moderator_id = None;
        self.reconcile(flag).await
    }

    /// Creates a flag for the freet, or escalates the existing one to
    /// manual. Idempotent: calling twice leaves exactly one flag with the
    /// author as moderator.
    pub async fn create_or_escalate(
        &self,
        freet_id: Uuid,
        moderator_id: Option<Uuid>,
    ) -> Result<Flag> {
        self.ensure_freet(freet_id).await?;
        match self.flags.find_by_freet(freet_id).await? {
            Some(existing) => self.assign_moderator(existing).await,
            None => {
                let flag = Flag {
                    id: Uuid::now_v7(),
                    freet_id,
                    moderator_id,
                };
                self.flags.save(&flag).await?;
                Ok(flag)
            }
        }
    }

    /// Brings the freet's flag state in line with its votes: creates an
    /// AUTO flag when the freet has just become controversial, reconciles
    /// the existing flag otherwise. Callers invoke this after every vote
    /// change.
    pub async fn refresh_for_freet(&self, freet_id: Uuid) -> Result<Option<Flag>> {
        match self.flags.find_by_freet(freet_id).await? {
            Some(existing) => self.reconcile(existing).await,
            None => {
                if !self.controversial_now(freet_id).await? {
                    return Ok(None);
                }
                let flag = Flag {
                    id: Uuid::now_v7(),
                    freet_id,
                    moderator_id: None,
                };
                debug!(freet = %freet_id, "votes turned controversial, auto-flagging");
                self.flags.save(&flag).await?;
                Ok(Some(flag))
            }
        }
    }

    async fn controversial_now(&self, freet_id: Uuid) -> Result<bool> {
        let up = self.reactions.count_upvotes(freet_id).await?;
        let down = self.reactions.count_downvotes(freet_id).await?;
        Ok(is_controversial(up, down))
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

    #[test]
    fn controversy_needs_engagement_on_both_sides() {
        assert!(!is_controversial(3, 3));
        assert!(!is_controversial(3, 10));
        assert!(!is_controversial(10, 2));
        assert!(!is_controversial(0, 0));
    }

    #[test]
    fn controversy_needs_a_near_tie() {
        assert!(is_controversial(5, 5)); // margin 0%
        assert!(is_controversial(4, 4));
        assert!(is_controversial(10, 9)); // margin 10%
        assert!(is_controversial(9, 10)); // symmetric
        assert!(!is_controversial(100, 50)); // margin 50%
        assert!(!is_controversial(100, 80)); // margin exactly 20%
    }

    fn counts(up: u64, down: u64) -> MockReactionStore {
        let mut reactions = MockReactionStore::new();
        reactions.expect_count_upvotes().returning(move |_| Ok(up));
        reactions
            .expect_count_downvotes()
            .returning(move |_| Ok(down));
        reactions
    }

    fn freet_authored_by(author: Uuid) -> MockFreetStore {
        let mut freets = MockFreetStore::new();
        freets
            .expect_author_of()
            .returning(move |_| Ok(Some(author)));
        freets.expect_get_freet().returning(move |id| {
            Ok(Some(Freet {
                id,
                author_id: author,
                content: "flagged freet".to_string(),
                created_at: chrono::Utc::now(),
            }))
        });
        freets
    }

    fn auto_flag(freet_id: Uuid) -> Flag {
        Flag {
            id: Uuid::now_v7(),
            freet_id,
            moderator_id: None,
        }
    }

    #[tokio::test]
    async fn reconcile_deletes_auto_flag_when_calm() {
        let flag = auto_flag(Uuid::now_v7());
        let flag_id = flag.id;

        let mut flags = MockFlagStore::new();
        flags
            .expect_delete()
            .withf(move |id| *id == flag_id)
            .times(1)
            .returning(|_| Ok(()));
        flags.expect_save().times(0);

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(1, 0)),
            Arc::new(MockFreetStore::new()),
        );
        assert!(svc.reconcile(flag).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reconcile_keeps_auto_flag_while_controversial() {
        let flag = auto_flag(Uuid::now_v7());

        let mut flags = MockFlagStore::new();
        flags.expect_save().times(1).returning(|_| Ok(()));
        flags.expect_delete().times(0);

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(5, 5)),
            Arc::new(MockFreetStore::new()),
        );
        let kept = svc.reconcile(flag).await.unwrap().unwrap();
        assert!(kept.moderator_id.is_none());
    }

    #[tokio::test]
    async fn reconcile_keeps_manual_flag_regardless_of_votes() {
        let moderator = Uuid::now_v7();
        let flag = Flag {
            moderator_id: Some(moderator),
            ..auto_flag(Uuid::now_v7())
        };

        let mut flags = MockFlagStore::new();
        flags.expect_save().times(1).returning(|_| Ok(()));
        flags.expect_delete().times(0);

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(0, 0)),
            Arc::new(MockFreetStore::new()),
        );
        let kept = svc.reconcile(flag).await.unwrap().unwrap();
        assert_eq!(kept.moderator_id, Some(moderator));
    }

    #[tokio::test]
    async fn clear_moderator_demotes_to_auto_while_controversial() {
        let flag = Flag {
            moderator_id: Some(Uuid::now_v7()),
            ..auto_flag(Uuid::now_v7())
        };

        let saved = Arc::new(Mutex::new(None::<Flag>));
        let mut flags = MockFlagStore::new();
        {
            let sink = saved.clone();
            flags.expect_save().times(1).returning(move |f| {
                *sink.lock().unwrap() = Some(f.clone());
                Ok(())
            });
        }
        flags.expect_delete().times(0);

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(10, 9)),
            Arc::new(MockFreetStore::new()),
        );
        let kept = svc.clear_moderator(flag).await.unwrap().unwrap();
        assert!(kept.moderator_id.is_none());
        assert!(saved.lock().unwrap().as_ref().unwrap().moderator_id.is_none());
    }

    #[tokio::test]
    async fn clear_moderator_deletes_when_no_longer_controversial() {
        let flag = Flag {
            moderator_id: Some(Uuid::now_v7()),
            ..auto_flag(Uuid::now_v7())
        };

        let mut flags = MockFlagStore::new();
        flags.expect_delete().times(1).returning(|_| Ok(()));
        flags.expect_save().times(0);

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(2, 1)),
            Arc::new(MockFreetStore::new()),
        );
        assert!(svc.clear_moderator(flag).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_or_escalate_is_idempotent() {
        let freet_id = Uuid::now_v7();
        let author = Uuid::now_v7();

        let stored = Arc::new(Mutex::new(None::<Flag>));
        let mut flags = MockFlagStore::new();
        {
            let store = stored.clone();
            flags
                .expect_find_by_freet()
                .returning(move |_| Ok(store.lock().unwrap().clone()));
        }
        {
            let store = stored.clone();
            flags.expect_save().returning(move |f| {
                *store.lock().unwrap() = Some(f.clone());
                Ok(())
            });
        }

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(0, 0)),
            Arc::new(freet_authored_by(author)),
        );

        let first = svc.create_or_escalate(freet_id, Some(author)).await.unwrap();
        let second = svc.create_or_escalate(freet_id, Some(author)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.moderator_id, Some(author));
    }

    #[tokio::test]
    async fn refresh_creates_auto_flag_when_votes_turn_controversial() {
        let freet_id = Uuid::now_v7();

        let saved = Arc::new(Mutex::new(None::<Flag>));
        let mut flags = MockFlagStore::new();
        flags.expect_find_by_freet().returning(|_| Ok(None));
        {
            let sink = saved.clone();
            flags.expect_save().times(1).returning(move |f| {
                *sink.lock().unwrap() = Some(f.clone());
                Ok(())
            });
        }

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(6, 5)),
            Arc::new(MockFreetStore::new()),
        );
        let flag = svc.refresh_for_freet(freet_id).await.unwrap().unwrap();
        assert_eq!(flag.freet_id, freet_id);
        assert!(flag.moderator_id.is_none());
    }

    #[tokio::test]
    async fn refresh_is_a_no_op_for_calm_unflagged_freets() {
        let mut flags = MockFlagStore::new();
        flags.expect_find_by_freet().returning(|_| Ok(None));
        flags.expect_save().times(0);
        flags.expect_delete().times(0);

        let svc = FlagService::new(
            Arc::new(flags),
            Arc::new(counts(2, 2)),
            Arc::new(MockFreetStore::new()),
        );
        assert!(svc.refresh_for_freet(Uuid::now_v7()).await.unwrap().is_none());
    }
}
