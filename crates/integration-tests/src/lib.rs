//! Shared fixtures for the cross-crate scenario and API tests.
//!
//! Every fixture wires the real services over fresh in-memory stores, so
//! each test owns an isolated application and can drive it end to end.

use domains::{DraftStore, FlagStore, Freet, FreetStore, ReactionStore};
use services::{CommentService, FlagService, ReactionService, SplitterService};
use std::sync::Arc;
use storage_adapters::{
    MemoryDraftStore, MemoryFlagStore, MemoryFreetStore, MemoryReactionStore,
};
use uuid::Uuid;

/// A fully wired service stack sharing one set of in-memory stores.
pub struct TestApp {
    pub drafts: Arc<dyn DraftStore>,
    pub freet_store: Arc<dyn FreetStore>,
    pub reaction_store: Arc<dyn ReactionStore>,
    pub flag_store: Arc<dyn FlagStore>,
    pub splitter: Arc<SplitterService>,
    pub comments: Arc<CommentService>,
    pub reactions: Arc<ReactionService>,
    pub flags: Arc<FlagService>,
}

pub fn test_app(max_segment_len: usize) -> TestApp {
    let drafts: Arc<dyn DraftStore> = Arc::new(MemoryDraftStore::new());
    let freet_store: Arc<dyn FreetStore> = Arc::new(MemoryFreetStore::new());
    let reaction_store: Arc<dyn ReactionStore> = Arc::new(MemoryReactionStore::new());
    let flag_store: Arc<dyn FlagStore> = Arc::new(MemoryFlagStore::new());

    let flags = FlagService::new(
        flag_store.clone(),
        reaction_store.clone(),
        freet_store.clone(),
    );
    TestApp {
        splitter: Arc::new(SplitterService::new(
            drafts.clone(),
            freet_store.clone(),
            max_segment_len,
        )),
        comments: Arc::new(CommentService::new(freet_store.clone(), max_segment_len)),
        reactions: Arc::new(ReactionService::new(
            reaction_store.clone(),
            freet_store.clone(),
            flags.clone(),
        )),
        flags: Arc::new(flags),
        drafts,
        freet_store,
        reaction_store,
        flag_store,
    }
}

/// Publishes a single-segment freet for `author` through the splitter.
pub async fn publish_freet(app: &TestApp, author: Uuid, content: &str) -> Freet {
    app.splitter
        .create(author, content, &[])
        .await
        .expect("draft creation failed");
    app.splitter
        .materialize(author)
        .await
        .expect("publish failed")
}

/// Casts `ups` upvotes and `downs` downvotes from distinct voters and
/// returns the voter ids, upvoters first.
pub async fn cast_votes(app: &TestApp, freet_id: Uuid, ups: usize, downs: usize) -> Vec<Uuid> {
    let mut voters = Vec::with_capacity(ups + downs);
    for _ in 0..ups {
        let voter = Uuid::now_v7();
        app.reactions.cast(voter, freet_id, 1).await.expect("upvote failed");
        voters.push(voter);
    }
    for _ in 0..downs {
        let voter = Uuid::now_v7();
        app.reactions
            .cast(voter, freet_id, -1)
            .await
            .expect("downvote failed");
        voters.push(voter);
    }
    voters
}

#[cfg(feature = "web-axum")]
pub mod api {
    //! Helpers for driving the axum router in-process with `oneshot`.

    use super::TestApp;
    use api_adapters::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response};
    use axum::Router;
    use serde_json::Value;
    use uuid::Uuid;

    pub fn test_router(max_segment_len: usize) -> (Router, TestApp) {
        let app = super::test_app(max_segment_len);
        let state = AppState {
            splitter: app.splitter.clone(),
            comments: app.comments.clone(),
            reactions: app.reactions.clone(),
            flags: app.flags.clone(),
        };
        (api_adapters::router(state), app)
    }

    /// Builds a request, optionally authenticated via the `x-user-id`
    /// header and carrying a JSON body.
    pub fn request(
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request build failed"),
            None => builder.body(Body::empty()).expect("request build failed"),
        }
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read failed");
        serde_json::from_slice(&bytes).expect("body is not JSON")
    }
}
