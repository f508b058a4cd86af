//! # Routes
//!
//! This module coordinates the flow between HTTP requests and the
//! services. Handlers stay thin: extract identity, run the inline
//! ownership checks, delegate, shape the response.

pub mod comments;
pub mod flags;
pub mod reactions;
pub mod splits;

use axum::routing::{delete, get};
use axum::Router;
use services::{CommentService, FlagService, ReactionService, SplitterService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub splitter: Arc<SplitterService>,
    pub comments: Arc<CommentService>,
    pub reactions: Arc<ReactionService>,
    pub flags: Arc<FlagService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/splits",
            get(splits::get_split)
                .post(splits::create_or_publish)
                .patch(splits::patch_split)
                .delete(splits::discard_split),
        )
        .route("/api/flags", get(flags::list_flags))
        .route(
            "/api/flags/{id}",
            // POST interprets {id} as the freet, PUT/DELETE as the flag
            axum::routing::post(flags::flag_manually)
                .put(flags::confirm_flag)
                .delete(flags::unflag),
        )
        .route(
            "/api/reactions",
            get(reactions::list_reactions).post(reactions::cast_reaction),
        )
        .route("/api/reactions/{id}", delete(reactions::delete_reaction))
        .route(
            "/api/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/api/comments/{id}", delete(comments::delete_comment))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
