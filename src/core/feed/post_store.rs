use super::feed_models::Post;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum PostStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, ordered by id.
    async fn list_posts(&self) -> Result<Vec<Post>, PostStoreError>;
    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, PostStoreError>;
    /// Insert or replace a post by id.
    async fn save_post(&self, post: Post) -> Result<(), PostStoreError>;
}
