//! fritter/crates/services/src/lib.rs
//!
//! Business logic over the domain ports: the splitter, the flag
//! lifecycle, reactions and comments. Persistence and HTTP live in the
//! adapter crates.

pub mod comments;
pub mod flags;
pub mod reactions;
pub mod splitter;

pub use comments::CommentService;
pub use flags::{is_controversial, FlagService};
pub use reactions::ReactionService;
pub use splitter::SplitterService;
