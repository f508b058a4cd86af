//! # Fritter Binary
//!
//! The entry point that assembles the application based on compile-time
//! features.

use api_adapters::AppState;
use domains::{DraftStore, FlagStore, FreetStore, ReactionStore};
use services::{CommentService, FlagService, ReactionService, SplitterService};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-sqlite")]
use secrecy::ExposeSecret;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = configs::Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    // 1. Initialize the store implementation
    #[cfg(feature = "db-sqlite")]
    let (drafts, freets, reactions, flags) = {
        let pool = storage_adapters::connect(settings.database.url.expose_secret()).await?;
        tracing::info!("persistence: sqlite");
        (
            Arc::new(storage_adapters::SqliteDraftStore::new(pool.clone())) as Arc<dyn DraftStore>,
            Arc::new(storage_adapters::SqliteFreetStore::new(pool.clone())) as Arc<dyn FreetStore>,
            Arc::new(storage_adapters::SqliteReactionStore::new(pool.clone()))
                as Arc<dyn ReactionStore>,
            Arc::new(storage_adapters::SqliteFlagStore::new(pool)) as Arc<dyn FlagStore>,
        )
    };

    #[cfg(not(feature = "db-sqlite"))]
    let (drafts, freets, reactions, flags) = {
        tracing::info!("persistence: in-memory (state dies with the process)");
        (
            Arc::new(storage_adapters::MemoryDraftStore::new()) as Arc<dyn DraftStore>,
            Arc::new(storage_adapters::MemoryFreetStore::new()) as Arc<dyn FreetStore>,
            Arc::new(storage_adapters::MemoryReactionStore::new()) as Arc<dyn ReactionStore>,
            Arc::new(storage_adapters::MemoryFlagStore::new()) as Arc<dyn FlagStore>,
        )
    };

    // 2. Wire the services
    let flag_service = FlagService::new(flags, reactions.clone(), freets.clone());
    let state = AppState {
        splitter: Arc::new(SplitterService::new(
            drafts,
            freets.clone(),
            settings.max_segment_len,
        )),
        comments: Arc::new(CommentService::new(freets.clone(), settings.max_segment_len)),
        reactions: Arc::new(ReactionService::new(
            reactions,
            freets,
            flag_service.clone(),
        )),
        flags: Arc::new(flag_service),
    };

    // 3. Serve
    let app = api_adapters::router(state);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "fritter listening");
    axum::serve(listener, app).await?;
    Ok(())
}
