pub mod feed_models;
pub mod feed_service;
pub mod post_store;

pub use feed_models::{FeedEntry, FeedSnapshot, Post, RenderedComment, RenderedPost};
pub use feed_service::{FeedError, FeedService};
pub use post_store::{PostStore, PostStoreError};
