//! # Seeder
//!
//! Populates the SQLite store with a couple of users, a split thread,
//! comments and votes, so a fresh checkout has data to browse. Runs the
//! same services the server does; no rows are written behind their backs.

use domains::{DraftStore, FlagStore, FreetStore, ReactionStore};
use secrecy::ExposeSecret;
use services::{CommentService, FlagService, ReactionService, SplitterService};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = configs::Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    // 1. Open the database
    let pool = storage_adapters::connect(settings.database.url.expose_secret()).await?;
    let drafts: Arc<dyn DraftStore> = Arc::new(storage_adapters::SqliteDraftStore::new(pool.clone()));
    let freets: Arc<dyn FreetStore> = Arc::new(storage_adapters::SqliteFreetStore::new(pool.clone()));
    let reactions: Arc<dyn ReactionStore> =
        Arc::new(storage_adapters::SqliteReactionStore::new(pool.clone()));
    let flags: Arc<dyn FlagStore> = Arc::new(storage_adapters::SqliteFlagStore::new(pool));

    // 2. Wire the services
    let flag_service = FlagService::new(flags, reactions.clone(), freets.clone());
    let splitter = SplitterService::new(drafts, freets.clone(), settings.max_segment_len);
    let comments = CommentService::new(freets.clone(), settings.max_segment_len);
    let reaction_service = ReactionService::new(reactions, freets, flag_service.clone());

    // 3. A split thread: one draft published as a freet plus two comments
    let alice = Uuid::now_v7();
    splitter
        .create(
            alice,
            "Hot take: pineapple belongs on pizza. The sweetness cuts the salt, \
             and the texture contrast is the whole point. Fight me in the comments.",
            &[38, 112],
        )
        .await?;
    let thread = splitter.materialize(alice).await?;
    tracing::info!(freet = %thread.id, "seeded a split thread");

    // 4. A reply from someone else
    let bob = Uuid::now_v7();
    comments
        .add(bob, thread.id, "Strong words for someone in crust-reach.")
        .await?;

    // 5. Votes split right down the middle, so the thread auto-flags
    for _ in 0..4 {
        reaction_service.cast(Uuid::now_v7(), thread.id, 1).await?;
        reaction_service.cast(Uuid::now_v7(), thread.id, -1).await?;
    }
    match flag_service.find_by_freet(thread.id).await? {
        Some(flag) => tracing::info!(flag = %flag.id, "controversy flagged the seeded thread"),
        None => tracing::warn!("expected the seeded thread to be flagged"),
    }

    // 6. A calm freet for contrast, left as a plain draft publish
    let carol = Uuid::now_v7();
    splitter.create(carol, "Nothing controversial here, just vibes.", &[]).await?;
    let calm = splitter.materialize(carol).await?;
    reaction_service.cast(bob, calm.id, 1).await?;

    tracing::info!("seeding complete");
    Ok(())
}
