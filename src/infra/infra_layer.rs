// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "comments/comment_store.rs"]
pub mod comments;

#[path = "posts/mod.rs"]
pub mod posts;

#[path = "classifier/mod.rs"]
pub mod classifier;
