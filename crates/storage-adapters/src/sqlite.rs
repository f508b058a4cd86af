//! # SQLite stores
//!
//! Maps the SQLite relational model to the domain models. UUIDs are
//! stored as 16-byte blobs; draft split offsets as a comma-separated
//! string ("3,7"), which keeps the schema flat.
//!
//! Uniqueness rules live in UNIQUE constraints plus a delete-then-insert
//! inside a transaction on save, so a replaced row can change identity
//! without tripping the constraint.

use async_trait::async_trait;
use domains::{
    Comment, Draft, DraftStore, Flag, FlagStore, Freet, FreetStore, Reaction, ReactionStore,
    VoteValue,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::BTreeSet;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS freets (
    id          BLOB PRIMARY KEY,
    author_id   BLOB NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS comments (
    id          BLOB PRIMARY KEY,
    author_id   BLOB NOT NULL,
    freet_id    BLOB NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS drafts (
    id            BLOB PRIMARY KEY,
    author_id     BLOB NOT NULL UNIQUE,
    content       TEXT NOT NULL,
    split_offsets TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS reactions (
    id        BLOB PRIMARY KEY,
    voter_id  BLOB NOT NULL,
    freet_id  BLOB NOT NULL,
    value     INTEGER NOT NULL,
    UNIQUE (voter_id, freet_id)
);
CREATE TABLE IF NOT EXISTS flags (
    id           BLOB PRIMARY KEY,
    freet_id     BLOB NOT NULL UNIQUE,
    moderator_id BLOB
);
";

/// Opens the pool and applies the schema.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    // In-memory SQLite gives every pooled connection its own database,
    // so those URLs are pinned to a single connection.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok(pool)
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Ok(Uuid::from_slice(blob)?)
}

fn offsets_to_string(offsets: &BTreeSet<usize>) -> String {
    offsets
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_offsets(raw: &str) -> anyhow::Result<BTreeSet<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Ok(s.parse::<usize>()?))
        .collect()
}

fn decode_vote(score: i32) -> anyhow::Result<VoteValue> {
    match score {
        1 => Ok(VoteValue::Up),
        -1 => Ok(VoteValue::Down),
        other => anyhow::bail!("corrupt vote value {other} in reactions table"),
    }
}

pub struct SqliteDraftStore {
    pool: SqlitePool,
}

impl SqliteDraftStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_draft(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Draft> {
    Ok(Draft {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id"))?,
        author_id: blob_to_uuid(&row.get::<Vec<u8>, _>("author_id"))?,
        content: row.get("content"),
        split_offsets: parse_offsets(&row.get::<String, _>("split_offsets"))?,
    })
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Draft>> {
        let row = sqlx::query("SELECT * FROM drafts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_draft).transpose()
    }

    async fn find_by_author(&self, author_id: Uuid) -> anyhow::Result<Option<Draft>> {
        let row = sqlx::query("SELECT * FROM drafts WHERE author_id = ?")
            .bind(uuid_to_blob(author_id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_draft).transpose()
    }

    async fn save(&self, draft: &Draft) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM drafts WHERE author_id = ? AND id != ?")
            .bind(uuid_to_blob(draft.author_id))
            .bind(uuid_to_blob(draft.id))
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT OR REPLACE INTO drafts (id, author_id, content, split_offsets) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(draft.id))
        .bind(uuid_to_blob(draft.author_id))
        .bind(&draft.content)
        .bind(offsets_to_string(&draft.split_offsets))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM drafts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct SqliteFreetStore {
    pool: SqlitePool,
}

impl SqliteFreetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_freet(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Freet> {
    Ok(Freet {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id"))?,
        author_id: blob_to_uuid(&row.get::<Vec<u8>, _>("author_id"))?,
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Comment> {
    Ok(Comment {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id"))?,
        author_id: blob_to_uuid(&row.get::<Vec<u8>, _>("author_id"))?,
        freet_id: blob_to_uuid(&row.get::<Vec<u8>, _>("freet_id"))?,
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl FreetStore for SqliteFreetStore {
    async fn create_freet(&self, freet: &Freet) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO freets (id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(freet.id))
        .bind(uuid_to_blob(freet.author_id))
        .bind(&freet.content)
        .bind(freet.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_freet(&self, id: Uuid) -> anyhow::Result<Option<Freet>> {
        let row = sqlx::query("SELECT * FROM freets WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_freet).transpose()
    }

    async fn author_of(&self, freet_id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let row = sqlx::query("SELECT author_id FROM freets WHERE id = ?")
            .bind(uuid_to_blob(freet_id))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| blob_to_uuid(&r.get::<Vec<u8>, _>("author_id")))
            .transpose()
    }

    async fn create_comment(&self, comment: &Comment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, author_id, freet_id, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(comment.id))
        .bind(uuid_to_blob(comment.author_id))
        .bind(uuid_to_blob(comment.freet_id))
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_comment).transpose()
    }

    async fn comments_for_freet(&self, freet_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let rows =
            sqlx::query("SELECT * FROM comments WHERE freet_id = ? ORDER BY created_at DESC")
                .bind(uuid_to_blob(freet_id))
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_comment).collect()
    }

    async fn comments_by_author(&self, author_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let rows =
            sqlx::query("SELECT * FROM comments WHERE author_id = ? ORDER BY created_at DESC")
                .bind(uuid_to_blob(author_id))
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_comment).collect()
    }

    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_comments_by_author(&self, author_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comments WHERE author_id = ?")
            .bind(uuid_to_blob(author_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct SqliteReactionStore {
    pool: SqlitePool,
}

impl SqliteReactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count_value(&self, freet_id: Uuid, score: i32) -> anyhow::Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reactions WHERE freet_id = ? AND value = ?")
                .bind(uuid_to_blob(freet_id))
                .bind(score)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}

fn row_to_reaction(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Reaction> {
    Ok(Reaction {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id"))?,
        voter_id: blob_to_uuid(&row.get::<Vec<u8>, _>("voter_id"))?,
        freet_id: blob_to_uuid(&row.get::<Vec<u8>, _>("freet_id"))?,
        value: decode_vote(row.get::<i32, _>("value"))?,
    })
}

#[async_trait]
impl ReactionStore for SqliteReactionStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Reaction>> {
        let row = sqlx::query("SELECT * FROM reactions WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_reaction).transpose()
    }

    async fn find_by_voter_and_freet(
        &self,
        voter_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Option<Reaction>> {
        let row = sqlx::query("SELECT * FROM reactions WHERE voter_id = ? AND freet_id = ?")
            .bind(uuid_to_blob(voter_id))
            .bind(uuid_to_blob(freet_id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_reaction).transpose()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Reaction>> {
        let rows = sqlx::query("SELECT * FROM reactions")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_reaction).collect()
    }

    async fn list_for_freet(&self, freet_id: Uuid) -> anyhow::Result<Vec<Reaction>> {
        let rows = sqlx::query("SELECT * FROM reactions WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_reaction).collect()
    }

    async fn list_by_voter(&self, voter_id: Uuid) -> anyhow::Result<Vec<Reaction>> {
        let rows = sqlx::query("SELECT * FROM reactions WHERE voter_id = ?")
            .bind(uuid_to_blob(voter_id))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_reaction).collect()
    }

    async fn count_upvotes(&self, freet_id: Uuid) -> anyhow::Result<u64> {
        self.count_value(freet_id, 1).await
    }

    async fn count_downvotes(&self, freet_id: Uuid) -> anyhow::Result<u64> {
        self.count_value(freet_id, -1).await
    }

    async fn save(&self, reaction: &Reaction) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM reactions WHERE voter_id = ? AND freet_id = ? AND id != ?")
            .bind(uuid_to_blob(reaction.voter_id))
            .bind(uuid_to_blob(reaction.freet_id))
            .bind(uuid_to_blob(reaction.id))
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT OR REPLACE INTO reactions (id, voter_id, freet_id, value) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(reaction.id))
        .bind(uuid_to_blob(reaction.voter_id))
        .bind(uuid_to_blob(reaction.freet_id))
        .bind(reaction.value.score() as i32)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reactions WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reactions WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_voter(&self, voter_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reactions WHERE voter_id = ?")
            .bind(uuid_to_blob(voter_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct SqliteFlagStore {
    pool: SqlitePool,
}

impl SqliteFlagStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_flag(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Flag> {
    Ok(Flag {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id"))?,
        freet_id: blob_to_uuid(&row.get::<Vec<u8>, _>("freet_id"))?,
        moderator_id: row
            .get::<Option<Vec<u8>>, _>("moderator_id")
            .map(|blob| blob_to_uuid(&blob))
            .transpose()?,
    })
}

#[async_trait]
impl FlagStore for SqliteFlagStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Flag>> {
        let row = sqlx::query("SELECT * FROM flags WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_flag).transpose()
    }

    async fn find_by_freet(&self, freet_id: Uuid) -> anyhow::Result<Option<Flag>> {
        let row = sqlx::query("SELECT * FROM flags WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_flag).transpose()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Flag>> {
        let rows = sqlx::query("SELECT * FROM flags")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_flag).collect()
    }

    async fn save(&self, flag: &Flag) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM flags WHERE freet_id = ? AND id != ?")
            .bind(uuid_to_blob(flag.freet_id))
            .bind(uuid_to_blob(flag.id))
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT OR REPLACE INTO flags (id, freet_id, moderator_id) VALUES (?, ?, ?)",
        )
        .bind(uuid_to_blob(flag.id))
        .bind(uuid_to_blob(flag.freet_id))
        .bind(flag.moderator_id.map(uuid_to_blob))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM flags WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM flags WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn draft_round_trip_preserves_offsets() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let store = SqliteDraftStore::new(pool);

        let draft = Draft {
            id: Uuid::now_v7(),
            author_id: Uuid::now_v7(),
            content: "ABCDEFGHIJ".to_string(),
            split_offsets: [3, 7].into_iter().collect(),
        };
        store.save(&draft).await.unwrap();

        let loaded = store.load(draft.id).await.unwrap().unwrap();
        assert_eq!(loaded.content, draft.content);
        assert_eq!(loaded.split_offsets, draft.split_offsets);

        // second draft by the same author replaces the first
        let replacement = Draft {
            id: Uuid::now_v7(),
            author_id: draft.author_id,
            content: "again".to_string(),
            split_offsets: Default::default(),
        };
        store.save(&replacement).await.unwrap();
        assert!(store.load(draft.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn freet_and_comments_round_trip() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let store = SqliteFreetStore::new(pool);

        let author = Uuid::now_v7();
        let freet = Freet {
            id: Uuid::now_v7(),
            author_id: author,
            content: "head".to_string(),
            created_at: Utc::now(),
        };
        store.create_freet(&freet).await.unwrap();
        assert_eq!(store.author_of(freet.id).await.unwrap(), Some(author));

        let base = Utc::now();
        for i in 0..2i64 {
            store
                .create_comment(&Comment {
                    id: Uuid::now_v7(),
                    author_id: author,
                    freet_id: freet.id,
                    content: format!("tail {i}"),
                    created_at: base + chrono::Duration::milliseconds(i + 1),
                })
                .await
                .unwrap();
        }
        let listed = store.comments_for_freet(freet.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        // newest first
        assert_eq!(listed[0].content, "tail 1");
    }

    #[tokio::test]
    async fn reaction_unique_per_voter_and_freet() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let store = SqliteReactionStore::new(pool);

        let voter = Uuid::now_v7();
        let freet_id = Uuid::now_v7();
        store
            .save(&Reaction {
                id: Uuid::now_v7(),
                voter_id: voter,
                freet_id,
                value: VoteValue::Up,
            })
            .await
            .unwrap();
        store
            .save(&Reaction {
                id: Uuid::now_v7(),
                voter_id: voter,
                freet_id,
                value: VoteValue::Down,
            })
            .await
            .unwrap();

        assert_eq!(store.count_upvotes(freet_id).await.unwrap(), 0);
        assert_eq!(store.count_downvotes(freet_id).await.unwrap(), 1);
        assert_eq!(store.list_for_freet(freet_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn flag_moderator_may_be_null() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let store = SqliteFlagStore::new(pool);

        let flag = Flag {
            id: Uuid::now_v7(),
            freet_id: Uuid::now_v7(),
            moderator_id: None,
        };
        store.save(&flag).await.unwrap();
        let loaded = store.find_by_freet(flag.freet_id).await.unwrap().unwrap();
        assert!(loaded.moderator_id.is_none());

        store.delete(flag.id).await.unwrap();
        assert!(store.load(flag.id).await.unwrap().is_none());
    }
}
