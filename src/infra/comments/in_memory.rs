// In-memory implementation of CommentStore.
//
// Used when FEED_COMMENT_STORE=memory and in tests. Nothing survives a
// restart.

use crate::core::moderation::{
    Comment, CommentStore, Flag, FlagUpdate, ModerationError, NewComment,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Comments keyed by id. Ids come from a counter, so sorting by id gives
/// insertion order.
pub struct InMemoryCommentStore {
    comments: DashMap<u64, Comment>,
    next_id: AtomicU64,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self {
            comments: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryCommentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn create(&self, new: NewComment) -> Result<Comment, ModerationError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let comment = Comment {
            id,
            post_id: new.post_id,
            author: new.author,
            content: new.content,
            timestamp: new.timestamp,
            obscene: Flag::Unclassified,
            negative: Flag::Unclassified,
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update_flags(&self, id: u64, update: FlagUpdate) -> Result<Comment, ModerationError> {
        // get_mut holds the shard lock, so concurrent updates to one comment
        // are serialized and write-once holds
        let mut entry = self
            .comments
            .get_mut(&id)
            .ok_or(ModerationError::NotFound(id))?;
        update.apply_to(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn get(&self, id: u64) -> Result<Option<Comment>, ModerationError> {
        Ok(self.comments.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_by_post(&self, post_id: u64) -> Result<Vec<Comment>, ModerationError> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.value().post_id == post_id)
            .map(|entry| entry.value().clone())
            .collect();
        comments.sort_by_key(|c| c.id);
        Ok(comments)
    }
}
