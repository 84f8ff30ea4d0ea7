use super::feed_models::{FeedEntry, FeedSnapshot, Post, RenderedPost};
use super::post_store::{PostStore, PostStoreError};
use crate::core::moderation::{Comment, CommentStore, ModerationError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Post store error: {0}")]
    Posts(#[from] PostStoreError),
    #[error("Comment store error: {0}")]
    Comments(#[from] ModerationError),
    #[error("Post {0} not found")]
    PostNotFound(u64),
}

/// Holds the current feed snapshot and the operations that change it.
///
/// The comment store is shared with the moderation pipeline; this service
/// only reads from it.
pub struct FeedService<P: PostStore, S: CommentStore> {
    posts: P,
    comments: Arc<S>,
    snapshot: RwLock<FeedSnapshot>,
    // Held across read-toggle-save so concurrent likes don't overwrite each other
    like_lock: Mutex<()>,
}

impl<P: PostStore, S: CommentStore> FeedService<P, S> {
    pub fn new(posts: P, comments: Arc<S>) -> Self {
        Self {
            posts,
            comments,
            snapshot: RwLock::new(FeedSnapshot::default()),
            like_lock: Mutex::new(()),
        }
    }

    /// Reload every post and all of its comments, replacing the snapshot.
    ///
    /// This can interleave with in-flight classifications. A comment read
    /// before its flags are written stays unflagged here until the next
    /// refresh; the store stays the source of truth.
    pub async fn refresh(&self) -> Result<usize, FeedError> {
        let posts = self.posts.list_posts().await?;
        let mut entries = Vec::with_capacity(posts.len());
        for post in posts {
            let comments = self.comments.list_by_post(post.id).await?;
            entries.push(FeedEntry { post, comments });
        }

        let count = entries.len();
        let mut snapshot = self.snapshot.write().await;
        *snapshot = FeedSnapshot {
            entries,
            refreshed_at: Some(Utc::now()),
        };
        Ok(count)
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Render the current snapshot. Every call re-evaluates the render
    /// policy, so redaction notices carry this call's time.
    pub async fn render(&self) -> Vec<RenderedPost> {
        let rendered_at = Utc::now();
        let snapshot = self.snapshot.read().await;
        snapshot
            .entries
            .iter()
            .map(|entry| entry.render_at(rendered_at))
            .collect()
    }

    pub async fn post_exists(&self, post_id: u64) -> Result<bool, FeedError> {
        Ok(self.posts.get_post(post_id).await?.is_some())
    }

    /// Like or unlike a post on behalf of the viewer.
    pub async fn toggle_like(&self, post_id: u64) -> Result<Post, FeedError> {
        let _guard = self.like_lock.lock().await;
        let mut post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(FeedError::PostNotFound(post_id))?;
        post.toggle_like();
        self.posts.save_post(post.clone()).await?;

        let mut snapshot = self.snapshot.write().await;
        if let Some(entry) = snapshot.entries.iter_mut().find(|e| e.post.id == post_id) {
            entry.post = post.clone();
        }
        Ok(post)
    }

    /// Put a just-submitted comment into the snapshot so it shows up before
    /// the next refresh. Comments are only ever appended.
    pub async fn append_comment(&self, comment: Comment) {
        let mut snapshot = self.snapshot.write().await;
        if let Some(entry) = snapshot
            .entries
            .iter_mut()
            .find(|e| e.post.id == comment.post_id)
        {
            if !entry.comments.iter().any(|c| c.id == comment.id) {
                entry.comments.push(comment);
            }
        }
    }
}
