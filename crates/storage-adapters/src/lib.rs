//! fritter/crates/storage-adapters/src/lib.rs
//!
//! Persistence implementations of the domain ports. The in-memory stores
//! are always compiled; SQLite sits behind the `db-sqlite` feature.

pub mod memory;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use memory::{MemoryDraftStore, MemoryFlagStore, MemoryFreetStore, MemoryReactionStore};

#[cfg(feature = "db-sqlite")]
pub use sqlite::{
    connect, SqliteDraftStore, SqliteFlagStore, SqliteFreetStore, SqliteReactionStore,
};
